//! File-backed cart persistence across store sessions.

use std::fs;

use testresult::TestResult;

use athfal::prelude::*;

fn kit() -> TestResult<Product> {
    Ok(Product {
        id: ProductId::from("sensory-play-kit"),
        name: "Sensory Play Kit".to_string(),
        price: Rupiah::new(100_000),
        tax_rate: TaxRate::from_points(11)?,
        stock: 12,
        category: ProductCategory::PlayKit,
    })
}

#[test]
fn cart_survives_reopening_the_store() -> TestResult {
    let dir = tempfile::tempdir()?;

    {
        let mut store = CartStore::open(FileCartStorage::in_dir(dir.path()));

        store.add_line(kit()?, 2)?;
        store.add_line(kit()?, 1)?;
    }

    let store = CartStore::open(FileCartStorage::in_dir(dir.path()));

    assert_eq!(store.cart().len(), 1);
    assert_eq!(store.cart().quantity_of("sensory-play-kit"), 3);

    Ok(())
}

#[test]
fn blob_is_written_under_the_cart_key() -> TestResult {
    let dir = tempfile::tempdir()?;
    let mut store = CartStore::open(FileCartStorage::new(dir.path(), "session-42"));

    store.add_line(kit()?, 1)?;

    let blob = fs::read_to_string(dir.path().join("session-42.json"))?;

    assert!(blob.contains("sensory-play-kit"));

    Ok(())
}

#[test]
fn malformed_blob_rehydrates_as_empty_cart() -> TestResult {
    let dir = tempfile::tempdir()?;
    let storage = FileCartStorage::in_dir(dir.path());

    fs::write(storage.path(), "{\"lines\": [ not json")?;

    let store = CartStore::open(storage);

    assert!(store.cart().is_empty());

    Ok(())
}

#[test]
fn clearing_persists_an_empty_cart() -> TestResult {
    let dir = tempfile::tempdir()?;

    {
        let mut store = CartStore::open(FileCartStorage::in_dir(dir.path()));

        store.add_line(kit()?, 2)?;
        store.clear()?;
    }

    let store = CartStore::open(FileCartStorage::in_dir(dir.path()));

    assert!(store.cart().is_empty());

    Ok(())
}

#[test]
fn last_writer_wins_between_two_sessions() -> TestResult {
    let dir = tempfile::tempdir()?;

    let mut first = CartStore::open(FileCartStorage::in_dir(dir.path()));
    let mut second = CartStore::open(FileCartStorage::in_dir(dir.path()));

    first.add_line(kit()?, 5)?;
    second.add_line(kit()?, 1)?;

    let reopened = CartStore::open(FileCartStorage::in_dir(dir.path()));

    assert_eq!(reopened.cart().quantity_of("sensory-play-kit"), 1);

    Ok(())
}
