//! Registry and TCP transport tests with on-disk audit log and id store.

use console_dungeon::transport::{serve, Response};
use console_dungeon::{
    DungeonResult, JsonLinesAuditLog, RegistryConfig, SequentialIdGenerator, SessionRegistry,
};
use std::sync::Arc;
use tempfile::TempDir;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;

fn registry(dir: &TempDir) -> DungeonResult<(SessionRegistry, Arc<JsonLinesAuditLog>)> {
    let audit = Arc::new(JsonLinesAuditLog::new(dir.path())?);
    let ids = Arc::new(SequentialIdGenerator::persistent(dir.path())?);
    let registry = SessionRegistry::new(RegistryConfig::default(), ids, audit.clone())?;
    Ok((registry, audit))
}

#[test]
fn test_finished_games_are_audited_on_disk() -> DungeonResult<()> {
    let dir = TempDir::new()?;
    let (mut registry, audit) = registry(&dir)?;

    let (first, _) = registry.create()?;
    let (second, _) = registry.create()?;
    assert_eq!(first.as_str(), "1");
    assert_eq!(second.as_str(), "2");

    registry.execute(&first, "w.move(3,2)")?;
    registry.execute(&first, "end_game")?;
    let response = registry.execute(&first, "yes")?;
    assert!(!response.running);
    registry.force_end(&second)?;

    let records = audit.read_all()?;
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].game_id, first);
    assert_eq!(records[0].event, "abandoned");
    assert!(records[0].message.starts_with("final_score=-5 actions=1"));

    let meta = std::fs::read_to_string(dir.path().join("meta.json"))?;
    assert_eq!(meta, "{\"last_game_id\":2}");
    Ok(())
}

#[test]
fn test_ids_continue_after_restart() -> DungeonResult<()> {
    let dir = TempDir::new()?;
    {
        let (mut registry, _) = registry(&dir)?;
        registry.create()?;
    }
    let (mut registry, _) = registry(&dir)?;
    let (id, _) = registry.create()?;
    assert_eq!(id.as_str(), "2");
    Ok(())
}

async fn request(
    writer: &mut tokio::net::tcp::OwnedWriteHalf,
    lines: &mut tokio::io::Lines<BufReader<tokio::net::tcp::OwnedReadHalf>>,
    body: &str,
) -> DungeonResult<Response> {
    writer.write_all(format!("{}\n", body).as_bytes()).await?;
    let line = lines.next_line().await?.unwrap_or_default();
    Ok(serde_json::from_str(&line)?)
}

#[tokio::test]
async fn test_two_clients_share_the_registry() -> DungeonResult<()> {
    let dir = TempDir::new()?;
    let (registry, audit) = registry(&dir)?;

    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(serve(listener, Arc::new(Mutex::new(registry))));

    let (reader, mut alice) = TcpStream::connect(addr).await?.into_split();
    let mut alice_lines = BufReader::new(reader).lines();
    let (reader, mut bob) = TcpStream::connect(addr).await?.into_split();
    let mut bob_lines = BufReader::new(reader).lines();

    let created = tokio_test::assert_ok!(
        request(&mut alice, &mut alice_lines, r#"{"op":"create"}"#).await
    );
    let game_id = created.game_id.clone().unwrap();
    assert!(created.response_content.contains("Commands:"));

    let moved = request(
        &mut bob,
        &mut bob_lines,
        &format!(
            r#"{{"op":"execute","game_id":"{}","command":"w.move(3,2)"}}"#,
            game_id
        ),
    )
    .await?;
    assert_eq!(moved.response_content, "Warrior moved to cell (3, 2).");

    let ended = request(
        &mut alice,
        &mut alice_lines,
        &format!(r#"{{"op":"end","game_id":"{}"}}"#, game_id),
    )
    .await?;
    assert_eq!(ended.response_content, "Game over. Your score: -5.");
    assert!(!ended.is_on);

    let missing = request(
        &mut bob,
        &mut bob_lines,
        &format!(r#"{{"op":"status","game_id":"{}"}}"#, game_id),
    )
    .await?;
    assert_eq!(
        missing.error.as_deref(),
        Some("Game with ID 1 was not found")
    );

    assert_eq!(audit.read_all()?.len(), 1);
    Ok(())
}
