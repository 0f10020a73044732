use hrportal_store::engine::{MemoryMedium, Store};
use hrportal_store::model::{Entity, Objective, ObjectivePatch, ObjectiveStatus, Role, User, UserPatch};
use hrportal_store::repo::Repository;
use hrportal_store::server::Router;
use hrportal_store::service::{
    Backend, LocalUserService, NewUser, RemoteUserService, Selector, Status, UserService, UserUpdate,
};
use hrportal_store::Error;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};

async fn spawn_daemon() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let router = Router::new(Arc::new(LocalUserService::seeded(Duration::ZERO)));
    tokio::spawn(async move {
        let _ = router.serve(listener).await;
    });
    addr.to_string()
}

/// An address nothing listens on.
async fn dead_addr() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr.to_string()
}

fn new_user(email: &str) -> NewUser {
    NewUser {
        name: "Ines Moreau".to_string(),
        email: email.to_string(),
        password: "secret".to_string(),
        role: Role::Employee,
        department: "Finance".to_string(),
    }
}

#[tokio::test]
async fn test_selector_uses_reachable_remote() {
    let addr = spawn_daemon().await;
    let remote: Arc<dyn UserService> = Arc::new(RemoteUserService::new(addr));
    let local: Arc<dyn UserService> = Arc::new(LocalUserService::seeded(Duration::ZERO));
    let selector = Selector::new("user", Some(remote), local.clone());

    let service = selector.get_service().await;
    assert_eq!(selector.status().await, Status::Checked(Backend::Remote));

    let created = service.create(new_user("ines@hrportal.local")).await.unwrap();
    assert_eq!(service.list().await.unwrap().len(), 4);
    // The local substitute never saw the write.
    assert_eq!(local.list().await.unwrap().len(), 3);

    for _ in 0..3 {
        selector.get_service().await;
    }
    assert_eq!(selector.probe_count(), 1);

    let fetched = service.get_by_id(&created.id).await.unwrap();
    assert_eq!(fetched, Some(created));
}

#[tokio::test]
async fn test_remote_contract_matches_local() {
    let addr = spawn_daemon().await;
    let service = RemoteUserService::new(addr);
    service.ping().await.unwrap();

    assert!(matches!(service.create(new_user("admin@hrportal.local")).await, Err(Error::DuplicateEmail)));
    assert!(matches!(service.delete("missing").await, Err(Error::NotFound)));
    assert!(matches!(
        service.update(UserUpdate { id: "missing".into(), patch: UserPatch::default() }).await,
        Err(Error::NotFound)
    ));
    assert!(matches!(service.authenticate("admin@hrportal.local", "wrong").await, Err(Error::InvalidCredentials)));
    assert_eq!(service.get_by_id("missing").await.unwrap(), None);

    let updated = service
        .update(UserUpdate {
            id: "3".into(),
            patch: UserPatch { role: Some(Role::Manager), ..Default::default() },
        })
        .await
        .unwrap();
    assert_eq!(updated.role, Role::Manager);
    assert_eq!(service.by_role(Role::Manager).await.unwrap().len(), 2);
    assert_eq!(service.by_department("Human Resources").await.unwrap().len(), 1);

    let admin = service.authenticate("admin@hrportal.local", "admin123").await.unwrap();
    assert_eq!(admin.id, "1");

    service.delete("3").await.unwrap();
    assert_eq!(service.list().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_remote_and_local_agree_on_edge_arguments() {
    let addr = spawn_daemon().await;
    let remote = RemoteUserService::new(addr);
    let local = LocalUserService::seeded(Duration::ZERO);

    for id in ["", " 1", "1 ", "missing"] {
        assert_eq!(remote.get_by_id(id).await.unwrap(), local.get_by_id(id).await.unwrap(), "get {:?}", id);
        assert!(matches!(remote.delete(id).await, Err(Error::NotFound)), "delete {:?}", id);
        assert!(matches!(local.delete(id).await, Err(Error::NotFound)), "delete {:?}", id);
    }
    for department in ["", " Engineering", "Engineering", "human resources"] {
        let remote_ids: Vec<String> = remote.by_department(department).await.unwrap().into_iter().map(|u| u.id).collect();
        let local_ids: Vec<String> = local.by_department(department).await.unwrap().into_iter().map(|u| u.id).collect();
        assert_eq!(remote_ids, local_ids, "department {:?}", department);
    }
    assert!(remote.by_department(" Engineering").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_line_breaks_in_arguments_stay_inside_one_command() {
    let addr = spawn_daemon().await;
    let remote = RemoteUserService::new(addr);

    assert_eq!(remote.get_by_id("x\nDELETE 1").await.unwrap(), None);
    assert!(matches!(remote.delete("2\r\nDELETE 1").await, Err(Error::NotFound)));
    assert!(remote.by_department("Sales\nLIST").await.unwrap().is_empty());

    let ids: Vec<String> = remote.list().await.unwrap().into_iter().map(|u| u.id).collect();
    assert_eq!(ids, ["1", "2", "3"]);
}

#[tokio::test]
async fn test_unreachable_remote_falls_back_to_local_substitute() {
    let remote: Arc<dyn UserService> = Arc::new(RemoteUserService::new(dead_addr().await));
    let local: Arc<dyn UserService> = Arc::new(LocalUserService::seeded(Duration::from_millis(20)));
    let selector = Selector::new("user", Some(remote), local);
    let store = Store::new(Arc::new(MemoryMedium::new()));

    let service = selector.get_service().await;
    assert_eq!(selector.status().await, Status::Checked(Backend::Local));

    let start = Instant::now();
    let created = service.create(new_user("ines@hrportal.local")).await.unwrap();
    assert!(start.elapsed() >= Duration::from_millis(20));

    assert!(service.list().await.unwrap().iter().any(|u| u.id == created.id));
    let persisted: Vec<User> = store.load();
    assert!(persisted.iter().all(|u| u.id != created.id));

    selector.get_service().await;
    assert_eq!(selector.probe_count(), 1);
}

#[tokio::test]
async fn test_objective_scenario_on_fresh_store() {
    let objectives = Repository::<Objective>::new(Store::new(Arc::new(MemoryMedium::new())));
    assert_eq!(objectives.list(), Objective::defaults());
    assert_eq!(objectives.list().len(), 2);

    let mut template = Objective::defaults().remove(0);
    template.id = "9".to_string();
    template.title = "X".to_string();
    template.status = ObjectiveStatus::NotStarted;
    objectives.add(template.clone()).unwrap();
    assert_eq!(objectives.list().len(), 3);

    objectives.update("9", ObjectivePatch { progress: Some(50), ..Default::default() });
    let nine = objectives.get("9").unwrap();
    assert_eq!(nine, Objective { progress: 50, ..template });

    objectives.delete("9");
    let remaining = objectives.list();
    assert_eq!(remaining.len(), 2);
    assert!(remaining.iter().all(|o| o.id != "9"));
}

#[tokio::test]
async fn test_raw_protocol() {
    let addr = spawn_daemon().await;
    let stream = TcpStream::connect(addr).await.unwrap();
    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);

    writer.write_all(b"PING\n").await.unwrap();
    let mut response = String::new();
    reader.read_line(&mut response).await.unwrap();
    assert_eq!(response.trim(), "PONG");

    writer.write_all(b"BY_ROLE \"admin\"\n").await.unwrap();
    response.clear();
    reader.read_line(&mut response).await.unwrap();
    assert!(response.starts_with("OK ["));
    assert!(response.contains("admin@hrportal.local"));

    writer.write_all(b"DELETE \"nobody\"\n").await.unwrap();
    response.clear();
    reader.read_line(&mut response).await.unwrap();
    assert_eq!(response.trim(), "ERR not found");
}
