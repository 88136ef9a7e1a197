pub mod http_port;

pub use http_port::HttpEntityPort;
