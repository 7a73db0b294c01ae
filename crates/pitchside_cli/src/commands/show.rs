use pitchside::{Collection, db, store};

/// Print one stored document as pretty JSON.
///
/// Reading a photo records the access.
pub(crate) async fn handle_show(
    collection: Collection,
    key: &str,
    raw: bool,
    database_url: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let db = db::connect(database_url).await?;

    let doc = store::find(&db, collection, key)
        .await?
        .ok_or_else(|| store::StoreError::not_found(collection, key))?;

    let value = if raw { doc.raw.clone() } else { doc.to_json() };
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}
