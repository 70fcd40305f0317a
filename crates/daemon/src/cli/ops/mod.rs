pub mod boards;
pub mod browse;
pub mod content;
pub mod health;
pub mod init;
pub mod login;
pub mod logout;
pub mod quote;
pub mod serve;
pub mod upload;
pub mod version;

pub use boards::Boards;
pub use browse::Browse;
pub use content::Content;
pub use health::Health;
pub use init::Init;
pub use login::Login;
pub use logout::Logout;
pub use quote::Quote;
pub use serve::Serve;
pub use upload::Upload;
pub use version::Version;
