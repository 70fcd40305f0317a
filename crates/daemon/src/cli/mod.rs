pub mod args;
pub mod op;
pub mod ops;

pub use ops::{Boards, Browse, Content, Health, Init, Login, Logout, Quote, Serve, Upload, Version};
