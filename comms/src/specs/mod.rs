//! Serde specifications for every protocol role.
//!
//! Binaries read their role spec from the json file named by the `SPEC` environment
//! variable, and their bind address from `HOST` and `PORT`.

mod relay;
mod server;
mod worker;

use std::{
    env,
    fs::File,
    io::{self, BufReader},
    net::{IpAddr, Ipv4Addr, SocketAddr},
    path::Path,
};

use serde::de::DeserializeOwned;

pub use relay::{BatchPolicy, RelaySpec};
pub use server::CoordinatorSpec;
pub use worker::{CompletionPolicy, WorkerSpec};

const DEFAULT_HOST: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);

/// Reads a json spec from `path`.
///
/// # Arguments
/// * `path` - The location of the json file.
///
/// # Returns
/// The parsed spec or an `io::Error` if the file can't be read or doesn't describe a `T`.
pub fn from_path<T: DeserializeOwned>(path: impl AsRef<Path>) -> io::Result<T> {
    let reader = BufReader::new(File::open(path)?);
    let spec = serde_json::from_reader(reader)?;
    Ok(spec)
}

/// Reads the json spec named by the `SPEC` environment variable.
pub fn from_env<T: DeserializeOwned>() -> io::Result<T> {
    let path = env::var("SPEC").map_err(io::Error::other)?;
    from_path(path)
}

/// Builds the local bind address out of the `HOST` and `PORT` environment variables.
///
/// `HOST` defaults to every interface, `PORT` is required.
pub fn bind_addr_from_env() -> io::Result<SocketAddr> {
    let host = match env::var("HOST") {
        Ok(host) => host
            .parse()
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?,
        Err(_) => DEFAULT_HOST,
    };

    let port = env::var("PORT")
        .map_err(io::Error::other)?
        .parse()
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

    Ok(SocketAddr::new(host, port))
}
