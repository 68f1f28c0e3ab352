//! Node Registry
//!
//! The closed catalogue of node tags the compiler accepts, with one
//! constructor per tag that validates arguments at compile time. Argument
//! problems surface here, with the source line, never during a tick.

use std::collections::BTreeMap;
use std::str::FromStr;

use mossgard_world::BattleKind;

use crate::error::BehaviourError;
use crate::leaves::{
    CompareOp, FactionFilter, Inspect, InspectTarget, Leaf, LeafKind, Operand, SortKey,
};
use crate::status::Status;
use crate::tree::{CompositeKind, DecoratorKind};

/// Attributes `sort-actors` and `inspect` may reference by name.
const NUMERIC_ATTRIBUTES: [&str; 5] = ["hp", "max_hp", "stamina", "max_stamina", "faction"];
const FLAG_ATTRIBUTES: [&str; 3] = [
    "prepared_to_battle",
    "prepared_to_attack",
    "prepared_to_defence",
];
/// Attributes with a maximum to resolve percent operands against.
const PERCENT_ATTRIBUTES: [&str; 2] = ["hp", "stamina"];

type DecoratorBuilder = fn(&[String], usize) -> Result<DecoratorKind, BehaviourError>;
type LeafBuilder = fn(&[String], usize) -> Result<Leaf, BehaviourError>;

/// How a tag turns its source line into a node body.
pub(crate) enum Builder {
    Composite(CompositeKind),
    Decorator(DecoratorBuilder),
    Leaf(LeafBuilder),
}

/// The tag table. Built once per library load; rejecting duplicate tags
/// keeps an extended catalogue honest.
pub struct Registry {
    entries: BTreeMap<&'static str, Builder>,
}

impl Registry {
    pub fn build() -> Result<Self, BehaviourError> {
        let mut entries = BTreeMap::new();
        for (tag, builder) in catalogue() {
            if entries.insert(tag, builder).is_some() {
                return Err(BehaviourError::DuplicateTag { tag: tag.into() });
            }
        }
        Ok(Self { entries })
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.entries.contains_key(tag)
    }

    pub fn tags(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.keys().copied()
    }

    /// The canonical static tag and its builder.
    pub(crate) fn lookup(&self, tag: &str) -> Option<(&'static str, &Builder)> {
        self.entries
            .get_key_value(tag)
            .map(|(canonical, builder)| (*canonical, builder))
    }
}

fn catalogue() -> Vec<(&'static str, Builder)> {
    vec![
        ("-->", Builder::Composite(CompositeKind::Sequence)),
        ("-?-", Builder::Composite(CompositeKind::Selector)),
        ("inverted", Builder::Decorator(inverted)),
        ("converted", Builder::Decorator(converted)),
        ("anyway", Builder::Decorator(anyway)),
        ("find-neighbours", Builder::Leaf(find_neighbours)),
        ("find-around", Builder::Leaf(find_around)),
        ("sort-actors", Builder::Leaf(sort_actors)),
        ("filter-actors", Builder::Leaf(filter_actors)),
        ("select-first", Builder::Leaf(select_first)),
        ("select-any", Builder::Leaf(select_any)),
        ("select-inspected", Builder::Leaf(select_inspected)),
        ("prepare-to-battle", Builder::Leaf(prepare_to_battle)),
        (
            "calculate-attack-direction",
            Builder::Leaf(calculate_attack_direction),
        ),
        (
            "calculate-flee-direction",
            Builder::Leaf(calculate_flee_direction),
        ),
        (
            "calculate-random-direction",
            Builder::Leaf(calculate_random_direction),
        ),
        (
            "calculate-previous-direction",
            Builder::Leaf(calculate_previous_direction),
        ),
        ("calculate-path", Builder::Leaf(calculate_path)),
        (
            "calculate-path-direction",
            Builder::Leaf(calculate_path_direction),
        ),
        ("check-direction", Builder::Leaf(check_direction)),
        ("move", Builder::Leaf(step)),
        ("wait", Builder::Leaf(wait)),
        ("inspect", Builder::Leaf(inspect)),
        ("include", Builder::Leaf(include)),
        ("random", Builder::Leaf(random)),
    ]
}

fn expect_args(
    tag: &'static str,
    args: &[String],
    expected: usize,
    line: usize,
) -> Result<(), BehaviourError> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(BehaviourError::WrongArgumentCount {
            line,
            tag: tag.into(),
            expected: match expected {
                0 => "no",
                1 => "1",
                2 => "2",
                3 => "3",
                _ => "4",
            },
            found: args.len(),
        })
    }
}

fn invalid(line: usize, message: impl Into<String>) -> BehaviourError {
    BehaviourError::InvalidArgument {
        line,
        message: message.into(),
    }
}

fn inverted(args: &[String], line: usize) -> Result<DecoratorKind, BehaviourError> {
    expect_args("inverted", args, 0, line)?;
    Ok(DecoratorKind::Inverted)
}

fn converted(args: &[String], line: usize) -> Result<DecoratorKind, BehaviourError> {
    expect_args("converted", args, 2, line)?;
    let parse = |text: &str| {
        Status::from_str(text).map_err(|()| invalid(line, format!("unknown status '{text}'")))
    };
    Ok(DecoratorKind::Converted {
        from: parse(&args[0])?,
        to: parse(&args[1])?,
    })
}

fn anyway(args: &[String], line: usize) -> Result<DecoratorKind, BehaviourError> {
    expect_args("anyway", args, 0, line)?;
    Ok(DecoratorKind::Anyway)
}

fn find_neighbours(args: &[String], line: usize) -> Result<Leaf, BehaviourError> {
    expect_args("find-neighbours", args, 0, line)?;
    Ok(Leaf::new(LeafKind::FindNeighbours))
}

fn find_around(args: &[String], line: usize) -> Result<Leaf, BehaviourError> {
    // The vertical radius defaults to the horizontal one.
    if args.is_empty() || args.len() > 2 {
        return Err(BehaviourError::WrongArgumentCount {
            line,
            tag: "find-around".into(),
            expected: "1 or 2",
            found: args.len(),
        });
    }
    let radius = |text: &str| -> Result<i32, BehaviourError> {
        let value: i32 = text
            .parse()
            .map_err(|_| invalid(line, format!("'{text}' is not a whole number")))?;
        if value < 0 {
            return Err(invalid(line, "search radius can not be negative"));
        }
        Ok(value)
    };
    let horizontal = radius(&args[0])?;
    let vertical = match args.get(1) {
        Some(text) => radius(text)?,
        None => horizontal,
    };
    Ok(Leaf::new(LeafKind::FindAround {
        horizontal,
        vertical,
    }))
}

fn sort_actors(args: &[String], line: usize) -> Result<Leaf, BehaviourError> {
    expect_args("sort-actors", args, 1, line)?;
    let (reverse, name) = match args[0].strip_prefix('-') {
        Some(stripped) => (true, stripped),
        None => (false, args[0].as_str()),
    };
    let key = if name == "distance" {
        SortKey::Distance
    } else if NUMERIC_ATTRIBUTES.contains(&name) {
        SortKey::Attribute(name.into())
    } else {
        return Err(invalid(line, format!("'{name}' is not a sortable key")));
    };
    Ok(Leaf::new(LeafKind::SortActors { key, reverse }))
}

fn filter_actors(args: &[String], line: usize) -> Result<Leaf, BehaviourError> {
    expect_args("filter-actors", args, 1, line)?;
    let filter = match args[0].as_str() {
        "any" => FactionFilter::Any,
        "enemy" => FactionFilter::Enemy,
        "friend" => FactionFilter::Friend,
        other => return Err(invalid(line, format!("unknown faction filter '{other}'"))),
    };
    Ok(Leaf::new(LeafKind::FilterActors(filter)))
}

fn select_first(args: &[String], line: usize) -> Result<Leaf, BehaviourError> {
    expect_args("select-first", args, 0, line)?;
    Ok(Leaf::new(LeafKind::SelectFirst))
}

fn select_any(args: &[String], line: usize) -> Result<Leaf, BehaviourError> {
    expect_args("select-any", args, 0, line)?;
    Ok(Leaf::new(LeafKind::SelectAny))
}

fn select_inspected(args: &[String], line: usize) -> Result<Leaf, BehaviourError> {
    expect_args("select-inspected", args, 0, line)?;
    Ok(Leaf::new(LeafKind::SelectInspected))
}

fn prepare_to_battle(args: &[String], line: usize) -> Result<Leaf, BehaviourError> {
    expect_args("prepare-to-battle", args, 1, line)?;
    let kind = BattleKind::from_str(&args[0]).map_err(|message| invalid(line, message))?;
    Ok(Leaf::new(LeafKind::PrepareToBattle(kind)))
}

fn calculate_attack_direction(args: &[String], line: usize) -> Result<Leaf, BehaviourError> {
    expect_args("calculate-attack-direction", args, 0, line)?;
    Ok(Leaf::new(LeafKind::CalculateAttackDirection))
}

fn calculate_flee_direction(args: &[String], line: usize) -> Result<Leaf, BehaviourError> {
    expect_args("calculate-flee-direction", args, 0, line)?;
    Ok(Leaf::new(LeafKind::CalculateFleeDirection))
}

fn calculate_random_direction(args: &[String], line: usize) -> Result<Leaf, BehaviourError> {
    expect_args("calculate-random-direction", args, 0, line)?;
    Ok(Leaf::new(LeafKind::CalculateRandomDirection))
}

fn calculate_previous_direction(args: &[String], line: usize) -> Result<Leaf, BehaviourError> {
    expect_args("calculate-previous-direction", args, 0, line)?;
    Ok(Leaf::new(LeafKind::CalculatePreviousDirection))
}

fn calculate_path(args: &[String], line: usize) -> Result<Leaf, BehaviourError> {
    expect_args("calculate-path", args, 0, line)?;
    Ok(Leaf::new(LeafKind::CalculatePath))
}

fn calculate_path_direction(args: &[String], line: usize) -> Result<Leaf, BehaviourError> {
    expect_args("calculate-path-direction", args, 0, line)?;
    Ok(Leaf::new(LeafKind::CalculatePathDirection))
}

fn check_direction(args: &[String], line: usize) -> Result<Leaf, BehaviourError> {
    expect_args("check-direction", args, 0, line)?;
    Ok(Leaf::new(LeafKind::CheckDirection))
}

fn step(args: &[String], line: usize) -> Result<Leaf, BehaviourError> {
    expect_args("move", args, 0, line)?;
    Ok(Leaf::new(LeafKind::Move))
}

fn wait(args: &[String], line: usize) -> Result<Leaf, BehaviourError> {
    expect_args("wait", args, 0, line)?;
    Ok(Leaf::new(LeafKind::Wait))
}

fn inspect(args: &[String], line: usize) -> Result<Leaf, BehaviourError> {
    expect_args("inspect", args, 4, line)?;
    let target = match args[0].as_str() {
        "self" => InspectTarget::Own,
        "any" => InspectTarget::Any,
        "all" => InspectTarget::All,
        other => return Err(invalid(line, format!("unknown inspect target '{other}'"))),
    };
    let attribute = args[1].as_str();
    if !NUMERIC_ATTRIBUTES.contains(&attribute) && !FLAG_ATTRIBUTES.contains(&attribute) {
        return Err(invalid(
            line,
            format!("'{attribute}' is not an inspectable attribute"),
        ));
    }
    let operator = match args[2].as_str() {
        "<" => CompareOp::Less,
        "<=" => CompareOp::LessEqual,
        "==" | "is" => CompareOp::Equal,
        "!=" | "not" => CompareOp::NotEqual,
        ">=" => CompareOp::GreaterEqual,
        ">" => CompareOp::Greater,
        other => return Err(invalid(line, format!("unknown operator '{other}'"))),
    };
    let operand = parse_operand(&args[3], attribute, line)?;
    Ok(Leaf::new(LeafKind::Inspect(Inspect {
        target,
        attribute: attribute.into(),
        operator,
        operand,
    })))
}

fn parse_operand(text: &str, attribute: &str, line: usize) -> Result<Operand, BehaviourError> {
    if let Some(percent) = text.strip_suffix('%') {
        if !PERCENT_ATTRIBUTES.contains(&attribute) {
            return Err(invalid(
                line,
                format!("'{attribute}' has no maximum to compare a percentage against"),
            ));
        }
        let value: f32 = percent
            .parse()
            .map_err(|_| invalid(line, format!("'{text}' is not a percentage")))?;
        return Ok(Operand::Percent(value));
    }
    match text {
        "true" => Ok(Operand::Flag(true)),
        "false" => Ok(Operand::Flag(false)),
        _ => {
            let value: f32 = text
                .parse()
                .map_err(|_| invalid(line, format!("'{text}' is not a number")))?;
            Ok(Operand::Number(value))
        }
    }
}

fn include(args: &[String], line: usize) -> Result<Leaf, BehaviourError> {
    expect_args("include", args, 1, line)?;
    Ok(Leaf::new(LeafKind::Include {
        tree: args[0].to_lowercase(),
    }))
}

fn random(args: &[String], line: usize) -> Result<Leaf, BehaviourError> {
    expect_args("random", args, 1, line)?;
    let probability: f64 = match args[0].strip_suffix('%') {
        Some(percent) => {
            percent
                .parse::<f64>()
                .map_err(|_| invalid(line, format!("'{}' is not a percentage", args[0])))?
                / 100.0
        }
        None => args[0]
            .parse()
            .map_err(|_| invalid(line, format!("'{}' is not a probability", args[0])))?,
    };
    if !(0.0..=1.0).contains(&probability) {
        return Err(invalid(line, "probability must be between 0 and 1"));
    }
    Ok(Leaf::new(LeafKind::Random { probability }))
}
