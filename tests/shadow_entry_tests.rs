use std::sync::Arc;

use memotrack::{
    EntityRef, EntryKind, InternalEntityEntry, PropertyBase, Result, TrackError, Value, ValueBuffer,
};


use fixtures::{Order, model, tag_entry};

#[test]
fn test_new_shadow_entry_starts_unset() -> Result<()> {
    let model = model()?;
    let entry = InternalEntityEntry::create(Arc::clone(&model.note), None, None)?;

    assert_eq!(entry.kind(), EntryKind::Shadow);
    assert!(entry.entity().is_none());

    let shadow_values = entry.shadow_values().unwrap();
    assert_eq!(shadow_values.len(), model.note.shadow_count());
    for slot in 0..shadow_values.len() {
        assert!(!shadow_values.is_set(slot)?);
        assert_eq!(shadow_values.get(slot)?, &Value::Null);
    }
    Ok(())
}

#[test]
fn test_shadow_write_then_read() -> Result<()> {
    let model = model()?;
    let mut entry = InternalEntityEntry::new_shadow(Arc::clone(&model.note))?;
    let title = model.note.property("Title")?;
    let rank = model.note.property("Rank")?;

    entry.write_property_value(title, "groceries")?;
    entry.write_property_value(rank, 2)?;

    assert_eq!(entry.get_current_value::<String>(title)?, "groceries");
    assert_eq!(entry.read_property_value(rank)?, Value::Integer(2));
    assert_eq!(entry.read_shadow_value::<i64>(rank.get_shadow_index()?)?, 2);

    entry.write_property_value(rank, Value::Null)?;
    assert_eq!(entry.get_current_value::<Option<i64>>(rank)?, None);
    assert!(entry.shadow_values().unwrap().is_set(rank.get_shadow_index()?)?);
    Ok(())
}

#[test]
fn test_shadow_entry_from_buffer() -> Result<()> {
    let model = model()?;
    let buffer = ValueBuffer::from(vec![Value::from("memo"), Value::Integer(9)]);
    let entry = InternalEntityEntry::create(Arc::clone(&model.note), None, Some(&buffer))?;

    assert_eq!(entry.kind(), EntryKind::Shadow);
    assert_eq!(
        entry.get_current_value::<String>(model.note.property("Title")?)?,
        "memo"
    );
    assert_eq!(
        entry.get_current_value::<i64>(model.note.property("Rank")?)?,
        9
    );
    Ok(())
}

#[test]
fn test_shadow_index_out_of_range() -> Result<()> {
    let model = model()?;
    let entry = InternalEntityEntry::new_shadow(Arc::clone(&model.note))?;

    let result = entry.read_shadow_value::<String>(model.note.shadow_count());
    assert!(matches!(
        result,
        Err(TrackError::ShadowIndexOutOfRange { .. })
    ));
    Ok(())
}

#[test]
fn test_object_required_for_clr_type() -> Result<()> {
    let model = model()?;
    let result = InternalEntityEntry::create(Arc::clone(&model.order), None, None);
    assert!(matches!(result, Err(TrackError::NoBackingObject(_))));
    Ok(())
}

#[test]
fn test_full_entry_has_no_snapshot() -> Result<()> {
    let model = model()?;
    let tag = tag_entry(&model, "green")?;

    assert_eq!(tag.kind(), EntryKind::Full);
    assert!(tag.shadow_values().is_none());
    assert_eq!(tag.get_current_value::<String>(model.tag.property("Name")?)?, "green");
    assert!(matches!(
        tag.read_shadow_value::<String>(0),
        Err(TrackError::NoShadowStorage(_))
    ));

    // A shadow member of another type cannot be stored on a full entry.
    let created_at = model.order.property("CreatedAt")?;
    assert!(matches!(
        tag.read_property_value(created_at),
        Err(TrackError::NoShadowStorage(_))
    ));
    Ok(())
}

#[test]
fn test_shadow_shadow_navigation() -> Result<()> {
    let model = model()?;
    let mut note = InternalEntityEntry::new_shadow(Arc::clone(&model.note))?;
    let links = model.note.navigation("Links")?;

    // Targets without a runtime type cannot be members.
    let other_note = InternalEntityEntry::new_shadow(Arc::clone(&model.note))?;
    assert!(!note.add_to_collection(links, &other_note)?);
    assert!(!note.collection_contains(links, &other_note)?);
    assert!(!note.remove_from_collection(links, &other_note)?);

    // Even real objects are not tracked in shadow-shadow mode.
    let object: EntityRef = Order::new(3);
    let order = InternalEntityEntry::create(Arc::clone(&model.order), Some(object), None)?;
    assert!(!note.add_to_collection(links, &order)?);
    assert!(!note.collection_contains(links, &order)?);

    let collection = note.get_or_create_collection(links)?;
    assert!(collection.read().unwrap().is_empty());
    assert!(note.shadow_values().unwrap().is_set(links.get_shadow_index()?)?);
    Ok(())
}

#[test]
fn test_shadow_entry_with_typed_navigation() -> Result<()> {
    let model = model()?;
    let board_type = memotrack::EntityTypeBuilder::new("Board")
        .property("Title")
        .navigation("Tags", memotrack::TargetType::of::<fixtures::Tag>("Tag"))
        .build(&model.factory)?;
    let tags = board_type.navigation("Tags")?;
    assert!(tags.is_shadow_property());

    let mut board = InternalEntityEntry::create(Arc::clone(&board_type), None, None)?;
    assert_eq!(board.kind(), EntryKind::Shadow);

    let red = tag_entry(&model, "red")?;
    assert!(board.add_to_collection(tags, &red)?);
    assert!(!board.add_to_collection(tags, &red)?);
    assert!(board.collection_contains(tags, &red)?);

    let collection = board.get_or_create_collection(tags)?;
    assert_eq!(collection.read().unwrap().len(), 1);
    let stored = board.shadow_values().unwrap().get(tags.get_shadow_index()?)?.clone();
    assert!(Arc::ptr_eq(stored.as_collection().unwrap(), &collection));

    assert!(board.remove_from_collection(tags, &red)?);
    assert!(!board.remove_from_collection(tags, &red)?);
    assert!(collection.read().unwrap().is_empty());
    Ok(())
}
