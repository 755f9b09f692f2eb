// ═══════════════════════════════════════════════════════════════════════
// Line protocol codec
//
// The referee speaks a line-oriented protocol: grid geometry once at
// start, then per turn a score line, visible agents and visible pellets.
// Commands go back as one `|`-joined line. This layer only parses and
// formats; the core consumes the parsed records.
// ═══════════════════════════════════════════════════════════════════════

use crate::grid::Grid;
use crate::types::{AgentKind, AgentUpdate, Command, PelletUpdate, Point, TurnInput};
use std::io::BufRead;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("unexpected end of input while reading {expected}")]
    UnexpectedEof { expected: &'static str },
    #[error("malformed {expected} line: {line:?}")]
    Malformed { expected: &'static str, line: String },
    #[error("read error: {0}")]
    Io(#[from] std::io::Error),
}

fn read_line(input: &mut impl BufRead, expected: &'static str) -> Result<String, ProtocolError> {
    let mut line = String::new();
    let n = input.read_line(&mut line)?;
    if n == 0 {
        return Err(ProtocolError::UnexpectedEof { expected });
    }
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn parse_ints<const N: usize>(
    line: &str,
    expected: &'static str,
) -> Result<[i32; N], ProtocolError> {
    let mut out = [0i32; N];
    let mut tokens = line.split_whitespace();
    for slot in &mut out {
        *slot = tokens
            .next()
            .and_then(|t| t.parse().ok())
            .ok_or_else(|| ProtocolError::Malformed {
                expected,
                line: line.to_string(),
            })?;
    }
    Ok(out)
}

/// Read the init block: `width height` then `height` rows of the maze.
pub fn read_init(input: &mut impl BufRead) -> Result<Grid, ProtocolError> {
    let header = read_line(input, "grid dimensions")?;
    let [width, height] = parse_ints::<2>(&header, "grid dimensions")?;
    let mut rows = Vec::with_capacity(height as usize);
    for _ in 0..height {
        rows.push(read_line(input, "grid row")?);
    }
    Ok(Grid::from_rows(width, height, &rows))
}

/// Read one turn block: scores, visible agents, visible pellets.
pub fn read_turn(input: &mut impl BufRead) -> Result<TurnInput, ProtocolError> {
    let score_line = read_line(input, "scores")?;
    let [my_score, opponent_score] = parse_ints::<2>(&score_line, "scores")?;

    let count_line = read_line(input, "visible agent count")?;
    let [agent_count] = parse_ints::<1>(&count_line, "visible agent count")?;
    let mut agents = Vec::with_capacity(agent_count.max(0) as usize);
    for _ in 0..agent_count {
        let line = read_line(input, "agent record")?;
        agents.push(parse_agent(&line)?);
    }

    let count_line = read_line(input, "visible pellet count")?;
    let [pellet_count] = parse_ints::<1>(&count_line, "visible pellet count")?;
    let mut pellets = Vec::with_capacity(pellet_count.max(0) as usize);
    for _ in 0..pellet_count {
        let line = read_line(input, "pellet record")?;
        let [x, y, value] = parse_ints::<3>(&line, "pellet record")?;
        pellets.push(PelletUpdate {
            position: Point::new(x, y),
            value,
        });
    }

    Ok(TurnInput {
        my_score,
        opponent_score,
        agents,
        pellets,
    })
}

fn parse_agent(line: &str) -> Result<AgentUpdate, ProtocolError> {
    let malformed = || ProtocolError::Malformed {
        expected: "agent record",
        line: line.to_string(),
    };
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() != 7 {
        return Err(malformed());
    }
    let int = |i: usize| tokens[i].parse::<i32>().map_err(|_| malformed());
    Ok(AgentUpdate {
        id: int(0)?,
        mine: int(1)? != 0,
        position: Point::new(int(2)?, int(3)?),
        kind: AgentKind::parse(tokens[4]).ok_or_else(|| malformed())?,
        speed_turns_left: int(5)? as u32,
        ability_cooldown: int(6)? as u32,
    })
}

/// Format one turn's commands as a single `|`-joined line.
pub fn format_commands(commands: &[Command]) -> String {
    commands
        .iter()
        .map(Command::to_string)
        .collect::<Vec<_>>()
        .join("|")
}
