use async_trait::async_trait;
use log::debug;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::sync::Mutex;

use crate::model::{Role, User};
use crate::service::{Credentials, NewUser, UserService, UserUpdate};
use crate::{Error, Result};

const ATTEMPTS: u64 = 3;

/// Client for a `hrportal-served` daemon.
///
/// The connection is opened lazily on the first call, so constructing a client never
/// fails; an unreachable daemon shows up as an `Io` error from that call.
pub struct RemoteUserService {
    addr: String,
    inner: Mutex<Option<Connection>>,
}

struct Connection {
    reader: BufReader<tokio::net::tcp::OwnedReadHalf>,
    writer: tokio::net::tcp::OwnedWriteHalf,
}

impl RemoteUserService {
    pub fn new(addr: impl Into<String>) -> Self {
        Self {
            addr: addr.into(),
            inner: Mutex::new(None),
        }
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }

    async fn connect(addr: &str) -> Result<Connection> {
        let stream = TcpStream::connect(addr).await?;
        let (reader, writer) = stream.into_split();
        Ok(Connection {
            reader: BufReader::new(reader),
            writer,
        })
    }

    /// Sends one command line and returns the payload of its `OK` reply.
    ///
    /// A dropped connection is reopened, up to three attempts in total.
    async fn send_and_receive(&self, cmd: String) -> Result<String> {
        let mut guard = self.inner.lock().await;

        for attempt in 0..ATTEMPTS {
            if guard.is_none() {
                match Self::connect(&self.addr).await {
                    Ok(conn) => *guard = Some(conn),
                    Err(e) => {
                        if attempt + 1 == ATTEMPTS {
                            return Err(e);
                        }
                        tokio::time::sleep(std::time::Duration::from_millis((attempt + 1) * 200)).await;
                        continue;
                    }
                }
            }
            let Some(conn) = guard.as_mut() else {
                continue;
            };

            if conn.writer.write_all(format!("{}\n", cmd).as_bytes()).await.is_err() {
                *guard = None;
                continue;
            }

            let mut resp = String::new();
            match conn.reader.read_line(&mut resp).await {
                Ok(0) | Err(_) => {
                    debug!("Connection to {} dropped, reconnecting", self.addr);
                    *guard = None;
                }
                Ok(_) => {
                    let resp = resp.trim();
                    if let Some(message) = resp.strip_prefix("ERR ") {
                        return Err(Error::from_wire(message));
                    }
                    return match resp {
                        "OK" | "PONG" => Ok(String::new()),
                        _ => resp
                            .strip_prefix("OK ")
                            .map(str::to_string)
                            .ok_or_else(|| Error::Internal(format!("invalid response: {}", resp))),
                    };
                }
            }
        }

        Err(Error::Internal(format!("failed after {} attempts", ATTEMPTS)))
    }

    async fn call<T: DeserializeOwned>(&self, cmd: String) -> Result<T> {
        let payload = self.send_and_receive(cmd).await?;
        Ok(serde_json::from_str(&payload)?)
    }

    /// Every argument travels as one JSON value, so line breaks inside it stay escaped.
    fn with_json<T: Serialize + ?Sized>(command: &str, body: &T) -> Result<String> {
        Ok(format!("{} {}", command, serde_json::to_string(body)?))
    }

    /// Round-trips a `PING`.
    pub async fn ping(&self) -> Result<()> {
        self.send_and_receive("PING".to_string()).await.map(|_| ())
    }
}

#[async_trait]
impl UserService for RemoteUserService {
    async fn create(&self, data: NewUser) -> Result<User> {
        self.call(Self::with_json("CREATE", &data)?).await
    }

    async fn list(&self) -> Result<Vec<User>> {
        self.call("LIST".to_string()).await
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<User>> {
        self.call(Self::with_json("GET", &id)?).await
    }

    async fn update(&self, update: UserUpdate) -> Result<User> {
        self.call(Self::with_json("UPDATE", &update)?).await
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.send_and_receive(Self::with_json("DELETE", &id)?).await.map(|_| ())
    }

    async fn by_role(&self, role: Role) -> Result<Vec<User>> {
        self.call(Self::with_json("BY_ROLE", &role)?).await
    }

    async fn by_department(&self, department: &str) -> Result<Vec<User>> {
        self.call(Self::with_json("BY_DEPT", &department)?).await
    }

    async fn authenticate(&self, email: &str, password: &str) -> Result<User> {
        let credentials = Credentials {
            email: email.to_string(),
            password: password.to_string(),
        };
        self.call(Self::with_json("AUTH", &credentials)?).await
    }
}
