use duo_core::hardware::sim::SimEngine;
use duo_core::{
    ColorFormat, EngineConfig, SpriteAttributes, SpriteEngine, SpriteError, SpriteSize, Surface,
};

fn engine() -> SpriteEngine<SimEngine> {
    SpriteEngine::new(SimEngine::new(), EngineConfig::default())
}

/// A sprite whose pixel `i` uses source palette index `i % colors`.
fn sprite(name: &str, y: i32, colors: u16, size: SpriteSize) -> SpriteAttributes {
    let palette: Vec<u16> = (0..colors).map(|c| 0x0400 + c * 3).collect();
    let tiles: Vec<u8> = (0..size.gfx_bytes(ColorFormat::Color256))
        .map(|i| (i % colors as usize) as u8)
        .collect();
    SpriteAttributes::new(name, 128, y, tiles.leak(), palette.leak()).with_size(size)
}

#[test]
fn transparent_colour_is_written_on_init() {
    let engine = engine();
    for surface in Surface::ALL {
        assert_eq!(engine.hardware().screen(surface).palette()[0], 0x7C1F);
        let palette = engine.surface(surface).palette();
        assert!(palette.is_taken(0));
        assert_eq!(palette.high_water(), 1);
    }
}

#[test]
fn palette_regions_across_destroy_and_compaction() {
    let mut engine = engine();
    let a = engine.create(sprite("A", 16, 16, SpriteSize::Size32x32)).unwrap();
    let b = engine.create(sprite("B", 16, 16, SpriteSize::Size32x32)).unwrap();
    assert_eq!(engine.sprite(a).unwrap().palette_offset(), 1);
    assert_eq!(engine.sprite(b).unwrap().palette_offset(), 16);
    assert_eq!(engine.palette_report(Surface::Primary).high_water, 31);

    assert_eq!(engine.destroy("A"), None);
    assert!(engine.get("A").is_none());
    let c = engine.create(sprite("C", 16, 8, SpriteSize::Size32x32)).unwrap();
    assert_eq!(engine.sprite(c).unwrap().palette_offset(), 31);
    assert_eq!(engine.palette_report(Surface::Primary).holes, [(1, 15)]);

    engine.compact(Surface::Primary);
    assert_eq!(engine.sprite(b).unwrap().palette_offset(), 1);
    assert_eq!(engine.sprite(c).unwrap().palette_offset(), 16);
    assert_eq!(engine.palette_report(Surface::Primary).high_water, 23);

    // B's first pixels were 0, 16, 17, 18 before the move
    let screen = engine.hardware().screen(Surface::Primary);
    let pixels = screen.gfx_bytes(engine.sprite(b).unwrap().gfx()).unwrap();
    assert_eq!(&pixels[..4], &[0, 1, 2, 3]);
}

#[test]
fn compaction_before_the_third_sprite() {
    let mut engine = engine();
    engine.create(sprite("A", 16, 16, SpriteSize::Size32x32)).unwrap();
    let b = engine.create(sprite("B", 16, 16, SpriteSize::Size32x32)).unwrap();
    engine.destroy("A");

    engine.compact(Surface::Primary);
    assert_eq!(engine.sprite(b).unwrap().palette_offset(), 1);
    assert_eq!(engine.palette_report(Surface::Primary).high_water, 16);

    let c = engine.create(sprite("C", 16, 8, SpriteSize::Size32x32)).unwrap();
    assert_eq!(engine.sprite(c).unwrap().palette_offset(), 16);
}

#[test]
fn creation_compacts_when_the_region_does_not_fit() {
    let mut engine = engine();
    engine.create(sprite("A", 16, 121, SpriteSize::Size8x8)).unwrap();
    let b = engine.create(sprite("B", 16, 121, SpriteSize::Size8x8)).unwrap();
    engine.destroy("A");
    // 240 entries used up to the high-water mark, 15 left
    assert_eq!(engine.palette_report(Surface::Primary).high_water, 241);

    let c = engine.create(sprite("C", 16, 31, SpriteSize::Size8x8)).unwrap();
    assert_eq!(engine.sprite(b).unwrap().palette_offset(), 1);
    assert_eq!(engine.sprite(c).unwrap().palette_offset(), 121);
    assert_eq!(engine.palette_report(Surface::Primary).high_water, 151);
}

#[test]
fn slot_pool_exhaustion_changes_nothing() {
    let mut engine = engine();
    for i in 0..128 {
        engine
            .create(sprite(&format!("s{}", i), 16, 2, SpriteSize::Size8x8))
            .unwrap();
    }
    let report = engine.palette_report(Surface::Primary);
    let blocks = engine.hardware().screen(Surface::Primary).blocks_in_use();

    let err = engine
        .create(sprite("one too many", 16, 2, SpriteSize::Size8x8))
        .unwrap_err();
    assert_eq!(err, SpriteError::SlotPoolFull(Surface::Primary));
    assert_eq!(engine.surface(Surface::Primary).slots().live(), 128);
    assert_eq!(engine.palette_report(Surface::Primary), report);
    assert_eq!(engine.hardware().screen(Surface::Primary).blocks_in_use(), blocks);
    assert_eq!(engine.len(), 128);

    // the other surface still has room
    engine
        .create(sprite("one too many", 300, 2, SpriteSize::Size8x8))
        .unwrap();
}

#[test]
fn duplicate_name_is_rejected_on_either_surface() {
    let mut engine = engine();
    engine.create(sprite("Starship", 16, 16, SpriteSize::Size32x32)).unwrap();
    let err = engine
        .create(sprite("Starship", 300, 16, SpriteSize::Size32x32))
        .unwrap_err();
    assert_eq!(err, SpriteError::DuplicateName("Starship".into()));
    assert_eq!(engine.sprites_on(Surface::Secondary).count(), 0);
    assert_eq!(engine.palette_report(Surface::Secondary).high_water, 1);
}

#[test]
fn palette_full_reports_the_shortfall() {
    let mut engine = engine();
    engine.create(sprite("A", 16, 250, SpriteSize::Size8x8)).unwrap();
    let err = engine.create(sprite("B", 16, 16, SpriteSize::Size8x8)).unwrap_err();
    assert_eq!(
        err,
        SpriteError::PaletteFull {
            name: "B".into(),
            surface: Surface::Primary,
            needed: 15,
            available: 6,
        }
    );
    assert_eq!(engine.surface(Surface::Primary).slots().live(), 1);
}

#[test]
fn graphics_memory_exhaustion_is_reported() {
    let mut engine = engine();
    // 1D/32 mapping addresses 32KB, room for eight 64x64 sprites
    for i in 0..8 {
        engine
            .create(sprite(&format!("p{}", i), 16, 2, SpriteSize::Size64x64))
            .unwrap();
    }
    let err = engine.create(sprite("p8", 16, 2, SpriteSize::Size64x64)).unwrap_err();
    assert_eq!(err, SpriteError::GraphicsMemoryFull(Surface::Primary));
    assert_eq!(engine.surface(Surface::Primary).slots().live(), 8);
    assert_eq!(engine.palette_report(Surface::Primary).high_water, 9);
}

#[test]
fn destroying_an_unknown_name() {
    let mut engine = engine();
    assert_eq!(engine.destroy("ghost"), None);
    assert_eq!(
        engine.try_destroy("ghost"),
        Err(SpriteError::NotFound("ghost".into()))
    );
}

#[test]
fn names_are_reusable_after_destroy() {
    let mut engine = engine();
    let first = engine.create(sprite("Starship", 16, 16, SpriteSize::Size32x32)).unwrap();
    engine.destroy("Starship");
    let second = engine.create(sprite("Starship", 16, 16, SpriteSize::Size32x32)).unwrap();

    assert_ne!(first, second);
    assert!(engine.sprite(first).is_none());
    assert_eq!(engine.get("Starship"), Some(second));
    // no compaction on destroy, the new region goes above the old one
    assert_eq!(engine.sprite(second).unwrap().palette_offset(), 16);
}
