//! End-to-end game scenarios driven through the command interpreter.

use console_dungeon::{
    generate_dungeon, CharacterClass, CommandInterpreter, DungeonResult, EnemyProfile,
    GameOutcome, GameState, GenerationConfig, Position, RuleViolation, Rules,
};
use rand::{rngs::StdRng, SeedableRng};

fn profile(name: &str, health: i32, close_attack: i32) -> EnemyProfile {
    EnemyProfile {
        name: name.to_string(),
        health,
        close_attack,
        ranged_attack: close_attack,
    }
}

fn empty_game() -> GameState {
    GameState::new(8, 8, Rules::default(), StdRng::seed_from_u64(11))
}

#[test]
fn test_killing_the_boss_wins() -> DungeonResult<()> {
    let mut game = empty_game();
    game.spawn_character(CharacterClass::Warrior, Position::new(2, 2))?;
    game.spawn_enemy(profile("Dragon", 50, 10), Position::new(3, 3), &[], true)?;

    let mut interpreter = CommandInterpreter::new();
    let text = interpreter.handle(&mut game, "w.attack(b)")?;

    assert!(text.contains("\"Dragon\" was defeated."));
    assert!(text.contains("You won!"));
    assert!(text.ends_with("Game over. Your score: 195."));
    assert_eq!(game.outcome(), Some(GameOutcome::Victory));
    assert!(!game.is_running());
    assert_eq!(game.statistics().bosses_defeated, 1);
    Ok(())
}

#[test]
fn test_losing_the_last_character_is_defeat() -> DungeonResult<()> {
    let mut game = empty_game();
    game.spawn_character(CharacterClass::Warrior, Position::new(7, 7))?;
    game.spawn_enemy(profile("Dragon", 1000, 250), Position::new(8, 8), &[], true)?;

    let mut interpreter = CommandInterpreter::new();
    let text = interpreter.handle(&mut game, "w.attack(8,8)")?;

    assert!(text.contains("strikes back!"));
    assert!(text.contains("Your character \"Warrior\" has fallen!"));
    assert!(text.contains("The enemies won!"));
    assert!(text.ends_with("Game over. Your score: -105."));
    assert_eq!(game.outcome(), Some(GameOutcome::Defeat));
    assert!(game.friendly_tags().is_empty());
    assert!(!game.tags().contains("w"));
    Ok(())
}

#[test]
fn test_cell_stays_guarded_until_last_protector_falls() -> DungeonResult<()> {
    let mut game = empty_game();
    game.spawn_character(CharacterClass::Warrior, Position::new(4, 5))?;
    let guarded = Position::new(4, 4);
    game.spawn_enemy(profile("Goblin", 10, 1), Position::new(5, 5), &[guarded], false)?;
    game.spawn_enemy(profile("Ogre", 10, 1), Position::new(5, 6), &[guarded], false)?;
    game.spawn_enemy(profile("Dragon", 500, 1), Position::new(8, 8), &[], true)?;

    let mut interpreter = CommandInterpreter::new();
    assert!(matches!(
        interpreter.handle(&mut game, "w.move(4,4)"),
        Err(RuleViolation::CellDefended(_))
    ));

    interpreter.handle(&mut game, "w.attack(e1)")?;
    assert!(game.board().cell_at(guarded)?.is_protected());
    assert!(matches!(
        interpreter.handle(&mut game, "w.move(4,4)"),
        Err(RuleViolation::CellDefended(_))
    ));

    interpreter.handle(&mut game, "w.attack(e2)")?;
    assert!(!game.board().cell_at(guarded)?.is_protected());
    assert_eq!(
        interpreter.handle(&mut game, "w.move(4,4)")?,
        "Warrior moved to cell (4, 4)."
    );
    assert_eq!(game.score(), 200);
    assert_eq!(game.history().len(), 3);
    Ok(())
}

#[test]
fn test_repeat_after_actor_died() -> DungeonResult<()> {
    let mut game = empty_game();
    game.spawn_character(CharacterClass::Warrior, Position::new(1, 1))?;
    game.spawn_character(CharacterClass::Archer, Position::new(7, 7))?;
    game.spawn_enemy(profile("Dragon", 500, 250), Position::new(8, 8), &[], true)?;

    let mut interpreter = CommandInterpreter::new();
    let text = interpreter.handle(&mut game, "a.attack(b)")?;
    assert!(text.contains("Your character \"Archer\" has fallen!"));
    assert!(game.is_running());

    assert!(matches!(
        interpreter.handle(&mut game, "repeat"),
        Err(RuleViolation::ActorUnavailable(_))
    ));
    assert!(matches!(
        interpreter.handle(&mut game, "a.move(6,6)"),
        Err(RuleViolation::NotControllable(_))
    ));
    Ok(())
}

#[test]
fn test_fairy_flight_and_walking_energy() -> DungeonResult<()> {
    let mut game = empty_game();
    game.spawn_character(CharacterClass::Fairy, Position::new(1, 1))?;
    game.spawn_character(CharacterClass::Warrior, Position::new(2, 2))?;
    game.spawn_enemy(profile("Dragon", 500, 1), Position::new(8, 8), &[], true)?;

    let mut interpreter = CommandInterpreter::new();
    assert_eq!(
        interpreter.handle(&mut game, "f.fly(8,1)")?,
        "Fairy flew to cell (8, 1)."
    );
    assert_eq!(game.character("f").map(|f| f.stats.energy), Some(95));

    assert!(matches!(
        interpreter.handle(&mut game, "w.fly(5,5)"),
        Err(RuleViolation::UnsupportedAction(_))
    ));

    if let Some(warrior) = game.character_mut("w") {
        warrior.stats.energy = 3;
    }
    assert!(matches!(
        interpreter.handle(&mut game, "w.move(4,4)"),
        Err(RuleViolation::InsufficientEnergy(_))
    ));
    assert_eq!(game.character("w").map(|w| w.position), Some(Position::new(2, 2)));

    interpreter.handle(&mut game, "w.move(3,3)")?;
    assert_eq!(game.character("w").map(|w| w.stats.energy), Some(1));
    Ok(())
}

#[test]
fn test_generated_dungeon_session() -> DungeonResult<()> {
    let mut game = generate_dungeon(&GenerationConfig::new(2024))?.state;
    let mut interpreter = CommandInterpreter::new();

    let field = interpreter.handle(&mut game, "print_field")?;
    assert!(field.contains('b'));
    assert!(field.contains("e7"));

    let info = interpreter.handle(&mut game, "info(b)")?;
    assert!(info.contains("Dragon"));

    assert!(interpreter.handle(&mut game, "info(inv)")?.contains("2 items"));
    interpreter.handle(&mut game, "w.use(health)")?;
    assert!(matches!(
        interpreter.handle(&mut game, "w.use(health)"),
        Err(RuleViolation::NoSuchItem(_))
    ));

    assert!(matches!(
        interpreter.handle(&mut game, "w.attack(b)"),
        Err(RuleViolation::TargetOutOfRange(_))
    ));
    assert!(matches!(
        interpreter.handle(&mut game, "w.attack(t)"),
        Err(RuleViolation::InvalidTarget(_))
    ));
    assert_eq!(game.history().len(), 1);
    Ok(())
}
