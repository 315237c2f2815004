use duo_core::hardware::sim::SimEngine;
use duo_core::{
    ColorFormat, EngineConfig, ObjectFlags, SpriteAttributes, SpriteEngine, SpriteError, SpriteId,
    SpriteSize, Surface,
};

fn engine() -> SpriteEngine<SimEngine> {
    SpriteEngine::new(SimEngine::new(), EngineConfig::default())
}

fn sprite(name: &str, y: i32, colors: u16) -> SpriteAttributes {
    let palette: Vec<u16> = (0..colors).map(|c| 0x1000 | c).collect();
    let tiles: Vec<u8> = (0..SpriteSize::Size32x32.gfx_bytes(ColorFormat::Color256))
        .map(|i| (i % colors as usize) as u8)
        .collect();
    SpriteAttributes::new(name, 84, y, tiles.leak(), palette.leak())
}

/// Every pixel of `id` resolves to the colour its source palette intended.
fn assert_colours_intact(engine: &SpriteEngine<SimEngine>, id: SpriteId) {
    let sprite = engine.sprite(id).unwrap();
    let screen = engine.hardware().screen(sprite.surface());
    let source = sprite.attributes().palette;
    let pixels = screen.gfx_bytes(sprite.gfx()).unwrap();
    for (i, &px) in pixels.iter().enumerate() {
        let index = i % source.len();
        if index == 0 {
            assert_eq!(px, 0);
        } else {
            assert_eq!(screen.palette()[px as usize], source[index], "pixel {}", i);
        }
    }
}

#[test]
fn crossing_the_boundary_rebuilds_on_the_other_surface() {
    let mut engine = engine();
    let ship = engine
        .create(sprite("Starship", 180, 16).with_flags(ObjectFlags::HFLIP).with_priority(2))
        .unwrap();
    engine.rotate(ship, 45).unwrap();
    assert_eq!(engine.sprite(ship).unwrap().surface(), Surface::Primary);

    engine.move_by(ship, 0, 20).unwrap();

    let sprite = engine.sprite(ship).unwrap();
    assert_eq!(sprite.surface(), Surface::Secondary);
    assert_eq!(sprite.y(), 200);
    assert_eq!(sprite.palette_offset(), 1);
    assert_eq!(sprite.rotation(), 45);
    assert_eq!(sprite.flags(), ObjectFlags::HFLIP);
    assert_eq!(sprite.attributes().priority, 2);
    assert!(sprite.affine().is_some());
    assert_eq!(engine.get("Starship"), Some(ship));
    assert_colours_intact(&engine, ship);

    let primary = engine.surface(Surface::Primary);
    assert_eq!(primary.slots().live(), 0);
    assert_eq!(primary.affine().live(), 0);
    assert_eq!(primary.palette().taken_count(), 1);
    assert_eq!(engine.hardware().screen(Surface::Primary).blocks_in_use(), 0);

    let secondary = engine.surface(Surface::Secondary);
    assert_eq!(secondary.slots().live(), 1);
    assert_eq!(secondary.affine().live(), 1);
}

#[test]
fn round_trip_keeps_the_handle() {
    let mut engine = engine();
    let ship = engine.create(sprite("Starship", 100, 16)).unwrap();

    engine.move_to(ship, 84, 250).unwrap();
    assert_eq!(engine.sprite(ship).unwrap().surface(), Surface::Secondary);
    engine.move_to(ship, 84, 100).unwrap();

    let sprite = engine.sprite(ship).unwrap();
    assert_eq!(sprite.surface(), Surface::Primary);
    // the old primary region was released without compaction
    assert_eq!(sprite.palette_offset(), 16);
    assert_colours_intact(&engine, ship);
    assert_eq!(engine.surface(Surface::Secondary).slots().live(), 0);
    assert_eq!(engine.palette_report(Surface::Secondary).taken, 1);
}

#[test]
fn round_trip_preserves_visual_attributes() {
    let mut engine = engine();
    let ship = engine
        .create(
            sprite("Starship", 100, 16)
                .with_flags(ObjectFlags::HFLIP | ObjectFlags::MOSAIC)
                .with_priority(3)
                .with_alpha(2),
        )
        .unwrap();
    engine.rotate(ship, 30).unwrap();
    engine.scale(ship, 512, 128).unwrap();
    let before = engine.sprite(ship).unwrap().attributes().clone();

    engine.move_by(ship, 0, 150).unwrap();
    let sprite = engine.sprite(ship).unwrap();
    assert_eq!(sprite.surface(), Surface::Secondary);
    let affine = sprite.affine().unwrap().index();
    let params = engine.hardware().screen(Surface::Secondary).affine(affine);
    assert_eq!((params.angle, params.scale_x, params.scale_y), (2730, 512, 128));

    engine.move_by(ship, 0, -150).unwrap();
    let sprite = engine.sprite(ship).unwrap();
    assert_eq!(sprite.surface(), Surface::Primary);
    assert_eq!(sprite.attributes(), &before);
    assert_eq!(engine.surface(Surface::Secondary).affine().live(), 0);

    let affine = sprite.affine().unwrap().index();
    let params = engine.hardware().screen(Surface::Primary).affine(affine);
    assert_eq!(params.angle, duo_core::degrees_to_angle(30));
    assert_eq!((params.scale_x, params.scale_y), (512, 128));

    engine.update_all();
    let slot = engine.sprite(ship).unwrap().slot().index();
    let entry = engine.hardware().screen(Surface::Primary).object(slot);
    assert_eq!(entry.affine_index(), Some(affine as u16));
    assert!(entry.mosaic());
    assert_eq!((entry.priority(), entry.alpha()), (3, 2));
    assert_colours_intact(&engine, ship);
}

#[test]
fn moving_within_a_surface_keeps_resources() {
    let mut engine = engine();
    let ship = engine.create(sprite("Starship", 16, 16)).unwrap();
    let before = engine.sprite(ship).unwrap().binding();
    engine.move_by(ship, 30, 150).unwrap();
    assert_eq!(engine.sprite(ship).unwrap().binding(), before);
}

#[test]
fn wrapping_past_the_top_lands_on_the_primary_surface() {
    let mut engine = engine();
    let ship = engine.create(sprite("Starship", 370, 16)).unwrap();
    assert_eq!(engine.sprite(ship).unwrap().surface(), Surface::Secondary);

    engine.move_by(ship, 0, 30).unwrap();
    let sprite = engine.sprite(ship).unwrap();
    assert_eq!(sprite.y(), 400);
    assert_eq!(sprite.surface(), Surface::Primary);
    assert_eq!(sprite.screen_position().1, 192 - 16 - 16);
}

#[test]
fn failed_migration_stays_put() {
    let mut engine = engine();
    engine.create(sprite("Planet", 300, 256)).unwrap();
    assert_eq!(engine.palette_report(Surface::Secondary).high_water, 256);

    let ship = engine.create(sprite("Starship", 180, 16)).unwrap();
    let before = engine.sprite(ship).unwrap().binding();
    let err = engine.move_by(ship, 0, 20).unwrap_err();
    assert!(matches!(err, SpriteError::PaletteFull { surface: Surface::Secondary, .. }));

    let sprite = engine.sprite(ship).unwrap();
    assert_eq!((sprite.x(), sprite.y()), (84, 180));
    assert_eq!(sprite.binding(), before);
    assert_eq!(engine.surface(Surface::Secondary).slots().live(), 1);
    assert_eq!(engine.hardware().screen(Surface::Secondary).blocks_in_use(), 1);
}

#[test]
fn migration_into_a_full_object_table() {
    let mut engine = engine();
    for i in 0..128 {
        let small = SpriteAttributes::new(format!("s{}", i), 0, 300, &[], &[])
            .with_size(SpriteSize::Size8x8);
        engine.create(small).unwrap();
    }
    let ship = engine.create(sprite("Starship", 180, 16)).unwrap();
    assert_eq!(
        engine.move_to(ship, 84, 200),
        Err(SpriteError::SlotPoolFull(Surface::Secondary))
    );
    assert_eq!(engine.sprite(ship).unwrap().surface(), Surface::Primary);
    assert_eq!(engine.sprite(ship).unwrap().y(), 180);
}
