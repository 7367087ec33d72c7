pub mod checksum;
pub mod codec;
pub mod command;
pub mod kelvinator;
