mod read_mail;

pub use read_mail::ReadMail;
