//! Evaluation coverage: control flow, memory wiring, and world effects
//! of the leaf catalogue against a small in-memory world.

use mossgard_behaviour::{Behaviour, Status, TreeLibrary};
use mossgard_world::{
    Actor, ActorId, Direction, GameHandler, GridMap, Knowledge, MemoryPath, Tile, Vector,
};

fn world() -> GameHandler {
    GameHandler::new(GridMap::filled(8, 8, Tile::Ground), 7)
}

fn spawn(game: &mut GameHandler, name: &str, faction: u32, x: i32, y: i32) -> ActorId {
    let mut actor = Actor::new(name, "goblin");
    actor.faction = faction;
    actor.position = Vector::new(x, y);
    game.insert_actor(actor)
}

fn library(sources: &[(&str, &str)]) -> TreeLibrary {
    TreeLibrary::from_sources(sources.iter().copied()).expect("library loads")
}

#[test]
fn sequence_stops_at_the_first_failure() {
    let library = library(&[(
        "main",
        "-->\n    inverted\n        wait\n    find-neighbours\n",
    )]);
    let mut game = world();
    let actor = spawn(&mut game, "a", 0, 1, 1);

    let status = library.evaluate("main", actor, &mut game).unwrap();
    assert_eq!(status, Status::Failure);

    // The node after the failing child was never reached.
    let tree = library.get("main").unwrap();
    let Behaviour::Composite { children, .. } = tree.root().behaviour() else {
        panic!("expected a composite root");
    };
    assert_eq!(children[0].last_evaluated(), Some((actor, Status::Failure)));
    assert_eq!(children[1].last_evaluated(), None);
    assert_eq!(tree.root().last_evaluated_child(), Some(0));
}

#[test]
fn selector_stops_at_the_first_success() {
    let library = library(&[("main", "-?-\n    wait\n    find-neighbours\n")]);
    let mut game = world();
    let actor = spawn(&mut game, "a", 0, 1, 1);

    assert_eq!(
        library.evaluate("main", actor, &mut game).unwrap(),
        Status::Success
    );
    let tree = library.get("main").unwrap();
    let Behaviour::Composite { children, .. } = tree.root().behaviour() else {
        panic!("expected a composite root");
    };
    assert_eq!(children[1].last_evaluated(), None);
}

#[test]
fn running_interrupts_both_composites() {
    // `converted success running` manufactures a RUNNING child.
    let library = library(&[(
        "main",
        "-->\n    converted success running\n        wait\n    wait\n",
    )]);
    let mut game = world();
    let actor = spawn(&mut game, "a", 0, 1, 1);

    assert_eq!(
        library.evaluate("main", actor, &mut game).unwrap(),
        Status::Running
    );
    let tree = library.get("main").unwrap();
    let Behaviour::Composite { children, .. } = tree.root().behaviour() else {
        panic!("expected a composite root");
    };
    assert_eq!(children[1].last_evaluated(), None);
}

#[test]
fn anyway_swallows_even_a_running_child() {
    let library = library(&[(
        "main",
        "anyway\n    converted success running\n        wait\n",
    )]);
    let mut game = world();
    let actor = spawn(&mut game, "a", 0, 1, 1);

    assert_eq!(
        library.evaluate("main", actor, &mut game).unwrap(),
        Status::Success
    );
}

#[test]
fn selector_without_a_direction_fails_without_moving() {
    let library = library(&[("main", "-?-\n    check-direction\n    move\n")]);
    let mut game = world();
    let actor = spawn(&mut game, "a", 0, 1, 1);

    assert_eq!(
        library.evaluate("main", actor, &mut game).unwrap(),
        Status::Failure
    );
    // Neither branch reached the world: no movement, nothing on record.
    let me = game.actor(actor).unwrap();
    assert_eq!(me.position, Vector::new(1, 1));
    assert!(me.last_actions().is_empty());
}

#[test]
fn inspect_gates_on_own_health() {
    let library = library(&[("main", "inspect self hp < 50%\n")]);
    let mut game = world();
    let actor = spawn(&mut game, "a", 0, 1, 1);

    assert_eq!(
        library.evaluate("main", actor, &mut game).unwrap(),
        Status::Failure
    );

    game.actor_mut(actor).unwrap().hp = 5;
    assert_eq!(
        library.evaluate("main", actor, &mut game).unwrap(),
        Status::Success
    );
}

#[test]
fn inspect_any_remembers_the_matching_actor() {
    let source = "\
-->
    find-neighbours
    inspect any hp < 50%
    select-inspected
";
    let library = library(&[("main", source)]);
    let mut game = world();
    let actor = spawn(&mut game, "a", 0, 1, 1);
    let healthy = spawn(&mut game, "b", 1, 2, 1);
    let wounded = spawn(&mut game, "c", 1, 1, 2);
    game.actor_mut(wounded).unwrap().hp = 3;
    let _ = healthy;

    assert_eq!(
        library.evaluate("main", actor, &mut game).unwrap(),
        Status::Success
    );
    let selected = game
        .actor(actor)
        .unwrap()
        .recall_knowledge(&MemoryPath::parse("selected_actor"), true);
    assert_eq!(selected, Some(Knowledge::Actor(wounded)));
}

#[test]
fn inspect_all_writes_nothing() {
    let source = "\
-->
    find-neighbours
    inspect all hp > 50%
";
    let library = library(&[("main", source)]);
    let mut game = world();
    let actor = spawn(&mut game, "a", 0, 1, 1);
    spawn(&mut game, "b", 1, 2, 1);
    let wounded = spawn(&mut game, "c", 1, 1, 2);

    assert_eq!(
        library.evaluate("main", actor, &mut game).unwrap(),
        Status::Success
    );
    assert!(game
        .actor(actor)
        .unwrap()
        .recall_knowledge(&MemoryPath::parse("inspected_actor"), true)
        .is_none());

    game.actor_mut(wounded).unwrap().hp = 2;
    assert_eq!(
        library.evaluate("main", actor, &mut game).unwrap(),
        Status::Failure
    );
}

#[test]
fn attack_pipeline_hurts_an_adjacent_enemy() {
    let source = "\
-->
    find-neighbours
    filter-actors enemy
    select-first
    calculate-attack-direction
    move
";
    let library = library(&[("main", source)]);
    let mut game = world();
    let attacker = spawn(&mut game, "attacker", 0, 1, 1);
    let friend = spawn(&mut game, "friend", 0, 0, 1);
    let enemy = spawn(&mut game, "enemy", 1, 2, 1);
    let _ = friend;

    assert_eq!(
        library.evaluate("main", attacker, &mut game).unwrap(),
        Status::Success
    );
    // Moving into the enemy resolved as an attack for 1 damage.
    assert_eq!(game.actor(enemy).unwrap().hp, 19);
    assert_eq!(game.actor(attacker).unwrap().position, Vector::new(1, 1));
}

#[test]
fn filter_enemy_fails_among_friends() {
    let source = "\
-->
    find-neighbours
    filter-actors enemy
";
    let library = library(&[("main", source)]);
    let mut game = world();
    let actor = spawn(&mut game, "a", 0, 1, 1);
    spawn(&mut game, "b", 0, 2, 1);

    assert_eq!(
        library.evaluate("main", actor, &mut game).unwrap(),
        Status::Failure
    );
    // The failed filter dropped the list it would have written.
    assert!(game
        .actor(actor)
        .unwrap()
        .recall_knowledge(&MemoryPath::parse("found_actors"), true)
        .is_none());
}

#[test]
fn walled_in_actor_cannot_pick_a_direction() {
    let mut map = GridMap::filled(3, 3, Tile::Water);
    map.set(Vector::new(1, 1), Tile::Ground);
    let mut game = GameHandler::new(map, 7);
    let actor = spawn(&mut game, "a", 0, 1, 1);

    let library = library(&[("main", "-->\n    calculate-random-direction\n    move\n")]);
    assert_eq!(
        library.evaluate("main", actor, &mut game).unwrap(),
        Status::Failure
    );
    assert_eq!(game.actor(actor).unwrap().position, Vector::new(1, 1));
}

#[test]
fn path_following_walks_to_the_destination() {
    let source = "\
-->
    calculate-path
    calculate-path-direction
    move
";
    let library = library(&[("main", source)]);
    let mut game = world();
    let actor = spawn(&mut game, "a", 0, 0, 0);
    game.actor_mut(actor).unwrap().remember_knowledge(
        &MemoryPath::parse("movement.destination"),
        Knowledge::Position(Vector::new(3, 0)),
    );

    // Like the driver, only act when the cooldown has passed. Cooldowns
    // are at most three ticks, so three steps fit comfortably here.
    for _ in 0..30 {
        game.begin_tick();
        if game.actor(actor).unwrap().next_action_time > game.time() {
            continue;
        }
        library.evaluate("main", actor, &mut game).unwrap();
    }
    assert_eq!(game.actor(actor).unwrap().position, Vector::new(3, 0));
}

#[test]
fn path_direction_consumes_waypoints_from_the_back() {
    let library = library(&[("main", "calculate-path-direction\n")]);
    let mut game = world();
    let actor = spawn(&mut game, "a", 0, 0, 0);
    game.actor_mut(actor).unwrap().remember_knowledge(
        &MemoryPath::parse("movement.path"),
        Knowledge::Positions(vec![Vector::new(2, 0), Vector::new(1, 0)]),
    );

    assert_eq!(
        library.evaluate("main", actor, &mut game).unwrap(),
        Status::Success
    );
    let me = game.actor(actor).unwrap();
    assert_eq!(
        me.recall_knowledge(&MemoryPath::parse("move_direction"), true),
        Some(Knowledge::Direction(Direction::Right))
    );
    assert_eq!(
        me.recall_knowledge(&MemoryPath::parse("movement.path"), true),
        Some(Knowledge::Positions(vec![Vector::new(2, 0)]))
    );
}

#[test]
fn previous_direction_repeats_the_last_move() {
    let source = "\
-->
    calculate-previous-direction
    check-direction
    move
";
    let library = library(&[("main", source)]);
    let mut game = world();
    let actor = spawn(&mut game, "a", 0, 1, 1);

    // No move on record yet.
    assert_eq!(
        library.evaluate("main", actor, &mut game).unwrap(),
        Status::Failure
    );

    game.move_actor(actor, Direction::Down);
    assert_eq!(game.actor(actor).unwrap().position, Vector::new(1, 2));

    game.begin_tick();
    game.begin_tick();
    game.begin_tick();
    assert_eq!(
        library.evaluate("main", actor, &mut game).unwrap(),
        Status::Success
    );
    assert_eq!(game.actor(actor).unwrap().position, Vector::new(1, 3));
}

#[test]
fn previous_direction_replays_even_a_refused_move() {
    let mut map = GridMap::filled(3, 3, Tile::Water);
    map.set(Vector::new(1, 1), Tile::Ground);
    let mut game = GameHandler::new(map, 7);
    let actor = spawn(&mut game, "a", 0, 1, 1);

    // The move into water is refused but still lands in the action log.
    game.move_actor(actor, Direction::Up);
    assert_eq!(game.actor(actor).unwrap().position, Vector::new(1, 1));

    let library = library(&[("main", "calculate-previous-direction\n")]);
    assert_eq!(
        library.evaluate("main", actor, &mut game).unwrap(),
        Status::Success
    );
    assert_eq!(
        game.actor(actor)
            .unwrap()
            .recall_knowledge(&MemoryPath::parse("move_direction"), true),
        Some(Knowledge::Direction(Direction::Up))
    );
}

#[test]
fn wrong_kind_memory_reads_as_absent() {
    let library = library(&[("main", "check-direction\n")]);
    let mut game = world();
    let actor = spawn(&mut game, "a", 0, 1, 1);
    game.actor_mut(actor).unwrap().remember_knowledge(
        &MemoryPath::parse("move_direction"),
        Knowledge::Number(4.0),
    );

    assert_eq!(
        library.evaluate("main", actor, &mut game).unwrap(),
        Status::Failure
    );
}

#[test]
fn include_evaluates_the_named_tree() {
    let library = library(&[
        ("main", "-->\n    include Ambush\n"),
        ("ambush", "inverted\n    find-neighbours\n"),
    ]);
    let mut game = world();
    let actor = spawn(&mut game, "a", 0, 1, 1);

    assert_eq!(
        library.evaluate("main", actor, &mut game).unwrap(),
        Status::Success
    );
}

#[test]
fn prepare_to_battle_banks_energy_once() {
    let library = library(&[("main", "prepare-to-battle defence\n")]);
    let mut game = world();
    let actor = spawn(&mut game, "a", 0, 1, 1);

    assert_eq!(
        library.evaluate("main", actor, &mut game).unwrap(),
        Status::Success
    );
    let banked = game.actor(actor).unwrap().defence_energy;
    assert!(banked >= 1);
    assert_eq!(game.actor(actor).unwrap().attack_energy, 0);

    // Already prepared: the bank is kept, no new action is spent.
    let actions_before = game.actor(actor).unwrap().last_actions().len();
    assert_eq!(
        library.evaluate("main", actor, &mut game).unwrap(),
        Status::Success
    );
    assert_eq!(game.actor(actor).unwrap().defence_energy, banked);
    assert_eq!(game.actor(actor).unwrap().last_actions().len(), actions_before);
}

#[test]
fn flee_direction_points_away_from_the_threat() {
    let source = "\
-->
    find-neighbours
    select-first
    calculate-flee-direction
";
    let library = library(&[("main", source)]);
    let mut game = world();
    let actor = spawn(&mut game, "prey", 0, 1, 1);
    spawn(&mut game, "threat", 1, 2, 1);

    assert_eq!(
        library.evaluate("main", actor, &mut game).unwrap(),
        Status::Success
    );
    let direction = game
        .actor(actor)
        .unwrap()
        .recall_knowledge(&MemoryPath::parse("move_direction"), true)
        .and_then(|value| value.as_direction());
    assert_ne!(direction, None);
    assert_ne!(direction, Some(Direction::Right));
}

#[test]
fn sort_actors_orders_by_distance() {
    let source = "\
-->
    find-around 3 3
    sort-actors distance
    select-first
";
    let library = library(&[("main", source)]);
    let mut game = world();
    let actor = spawn(&mut game, "a", 0, 1, 1);
    let far = spawn(&mut game, "far", 1, 4, 1);
    let near = spawn(&mut game, "near", 1, 2, 1);
    let _ = far;

    assert_eq!(
        library.evaluate("main", actor, &mut game).unwrap(),
        Status::Success
    );
    let selected = game
        .actor(actor)
        .unwrap()
        .recall_knowledge(&MemoryPath::parse("selected_actor"), true);
    assert_eq!(selected, Some(Knowledge::Actor(near)));
}

#[test]
fn same_seed_reproduces_a_run() {
    let source = "\
-->
    calculate-random-direction
    move
";
    let run = || {
        let library = library(&[("main", source)]);
        let mut game = world();
        let actor = spawn_at_fixed(&mut game);
        for _ in 0..10 {
            game.begin_tick();
            library.evaluate("main", actor, &mut game).unwrap();
        }
        game.actor(actor).unwrap().position
    };
    assert_eq!(run(), run());
}

fn spawn_at_fixed(game: &mut GameHandler) -> ActorId {
    let mut actor = Actor::new("wanderer", "goblin");
    actor.position = Vector::new(4, 4);
    game.insert_actor(actor)
}
