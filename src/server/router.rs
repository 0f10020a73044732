use std::sync::Arc;

use log::{error, info};
use serde::Serialize;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Semaphore;

use crate::model::Role;
use crate::service::{Credentials, NewUser, UserService, UserUpdate};
use crate::Result;

const MAX_CONNECTIONS: usize = 100;

pub struct Router {
    service: Arc<dyn UserService>,
    semaphore: Arc<Semaphore>,
}

impl Router {
    pub fn new(service: Arc<dyn UserService>) -> Self {
        Self {
            service,
            semaphore: Arc::new(Semaphore::new(MAX_CONNECTIONS)),
        }
    }

    pub async fn listen(&self, port: &str) -> Result<()> {
        let listener = TcpListener::bind(format!("0.0.0.0:{}", port)).await?;
        info!("User service listening on port {}", port);
        self.serve(listener).await
    }

    /// Accepts connections on an already bound listener until accepting fails.
    pub async fn serve(&self, listener: TcpListener) -> Result<()> {
        loop {
            let (socket, _) = listener.accept().await?;
            let service = self.service.clone();
            let sem = self.semaphore.clone();

            tokio::spawn(async move {
                let _permit = match sem.try_acquire() {
                    Ok(p) => p,
                    Err(_) => {
                        error!("Server busy: too many concurrent connections. Rejecting...");
                        let mut socket = socket;
                        let _ = socket.shutdown().await;
                        return;
                    }
                };

                if let Err(e) = handle_connection(socket, service).await {
                    error!("Connection error: {}", e);
                }
            });
        }
    }
}

fn reply<T: Serialize>(res: Result<T>) -> String {
    match res.and_then(|v| Ok(serde_json::to_string(&v)?)) {
        Ok(json) => format!("OK {}", json),
        Err(e) => format!("ERR {}", e.to_string().to_lowercase()),
    }
}

fn parse<T: serde::de::DeserializeOwned>(body: &str) -> Result<T> {
    Ok(serde_json::from_str(body)?)
}

const INVALID_JSON: &str = "ERR invalid json value";

/// Executes one command line. `None` means the client asked to quit.
///
/// Arguments are single JSON values and are handed to the service exactly as decoded.
async fn dispatch(service: &dyn UserService, line: &str) -> Option<String> {
    let (command, arg) = line.split_once(' ').unwrap_or((line, ""));

    let response = match command.to_uppercase().as_str() {
        "PING" => "PONG".to_string(),
        "QUIT" => return None,
        "LIST" => reply(service.list().await),
        "GET" => match parse::<String>(arg) {
            Ok(id) => reply(service.get_by_id(&id).await),
            Err(_) => INVALID_JSON.to_string(),
        },
        "CREATE" => match parse::<NewUser>(arg) {
            Ok(data) => reply(service.create(data).await),
            Err(_) => INVALID_JSON.to_string(),
        },
        "UPDATE" => match parse::<UserUpdate>(arg) {
            Ok(update) => reply(service.update(update).await),
            Err(_) => INVALID_JSON.to_string(),
        },
        "DELETE" => match parse::<String>(arg) {
            Ok(id) => match service.delete(&id).await {
                Ok(()) => "OK".to_string(),
                Err(e) => format!("ERR {}", e.to_string().to_lowercase()),
            },
            Err(_) => INVALID_JSON.to_string(),
        },
        "BY_ROLE" => match parse::<Role>(arg) {
            Ok(role) => reply(service.by_role(role).await),
            Err(_) => INVALID_JSON.to_string(),
        },
        "BY_DEPT" => match parse::<String>(arg) {
            Ok(department) => reply(service.by_department(&department).await),
            Err(_) => INVALID_JSON.to_string(),
        },
        "AUTH" => match parse::<Credentials>(arg) {
            Ok(c) => reply(service.authenticate(&c.email, &c.password).await),
            Err(_) => INVALID_JSON.to_string(),
        },
        _ => "ERR unknown command".to_string(),
    };
    Some(response)
}

pub async fn handle_connection(mut socket: TcpStream, service: Arc<dyn UserService>) -> Result<()> {
    let (reader, mut writer) = socket.split();
    let mut reader = BufReader::new(reader);
    let mut line = String::new();

    loop {
        line.clear();
        let bytes_read = reader.read_line(&mut line).await?;
        if bytes_read == 0 {
            break;
        }

        let command = line.trim_end_matches(['\r', '\n']);
        if command.trim().is_empty() {
            continue;
        }

        let Some(response) = dispatch(service.as_ref(), command).await else {
            break;
        };
        writer.write_all(format!("{}\n", response).as_bytes()).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::LocalUserService;
    use std::time::Duration;

    fn service() -> LocalUserService {
        LocalUserService::seeded(Duration::ZERO)
    }

    #[tokio::test]
    async fn test_dispatch_commands() {
        let service = service();
        assert_eq!(dispatch(&service, "PING").await.unwrap(), "PONG");
        assert!(dispatch(&service, "LIST").await.unwrap().starts_with("OK ["));
        assert_eq!(dispatch(&service, r#"GET "missing""#).await.unwrap(), "OK null");
        assert_eq!(dispatch(&service, r#"GET """#).await.unwrap(), "OK null");
        assert_eq!(dispatch(&service, r#"DELETE "missing""#).await.unwrap(), "ERR not found");
        assert_eq!(dispatch(&service, "GET").await.unwrap(), "ERR invalid json value");
        assert_eq!(dispatch(&service, "GET missing").await.unwrap(), "ERR invalid json value");
        assert_eq!(dispatch(&service, r#"BY_ROLE "janitor""#).await.unwrap(), "ERR invalid json value");
        assert_eq!(dispatch(&service, "CREATE {oops").await.unwrap(), "ERR invalid json value");
        assert_eq!(dispatch(&service, "FROB x").await.unwrap(), "ERR unknown command");
        assert!(dispatch(&service, "QUIT").await.is_none());
    }

    fn users(resp: &str) -> Vec<crate::model::User> {
        serde_json::from_str(resp.strip_prefix("OK ").unwrap()).unwrap()
    }

    #[tokio::test]
    async fn test_dispatch_passes_arguments_through_untouched() {
        let service = service();
        let found = users(&dispatch(&service, r#"BY_DEPT "Human Resources""#).await.unwrap());
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "1");

        assert!(users(&dispatch(&service, r#"BY_DEPT " Human Resources""#).await.unwrap()).is_empty());
        assert!(users(&dispatch(&service, r#"BY_DEPT """#).await.unwrap()).is_empty());
        assert_eq!(users(&dispatch(&service, r#"BY_ROLE "admin""#).await.unwrap()).len(), 1);
    }

    #[tokio::test]
    async fn test_escaped_line_break_stays_one_argument() {
        let service = service();
        let resp = dispatch(&service, r#"DELETE "x\nDELETE \"1\"""#).await.unwrap();
        assert_eq!(resp, "ERR not found");
        assert!(service.get_by_id("1").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_dispatch_auth_failure_uses_domain_message() {
        let service = service();
        let resp = dispatch(&service, r#"AUTH {"email":"admin@hrportal.local","password":"x"}"#).await.unwrap();
        assert_eq!(resp, "ERR invalid credentials");
    }
}
