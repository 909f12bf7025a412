use advent_activity::visitor;
use temp_dir::TempDir;

mod helpers;

#[tokio::test]
async fn test_ensure_is_idempotent() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let state = helpers::setup_test_state(dir.child("db.sqlite3")).await?;

    assert_eq!(visitor::find(&state.read_db, "01JEXAMPLE").await?, None);

    let first = visitor::ensure(&state.write_db, "01JEXAMPLE").await?;
    let second = visitor::ensure(&state.write_db, "01JEXAMPLE").await?;
    let other = visitor::ensure(&state.write_db, "01JOTHER").await?;

    assert_eq!(first, second);
    assert_ne!(first, other);
    assert_eq!(visitor::find(&state.read_db, "01JEXAMPLE").await?, Some(first));

    Ok(())
}
