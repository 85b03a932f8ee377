pub mod server;

pub use server::RendezvousServer;
