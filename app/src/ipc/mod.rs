pub mod message;
pub mod trait_impl;
pub mod traits;

pub use traits::connect_to_socket;

pub use traits::ReadSock;
pub use traits::RequestResponse;
pub use traits::WriteSock;
