//! Text form of machine descriptions
//!
//! ```text
//! machine:
//!   accept: [63, 93]
//!   reject: [40]
//!   #0: {0}L,{2}I,L
//! ```
//!
//! Each rule reads `{before}input,{after}output,dir` with `dir` one of `L`,
//! `R` or `-`.

use std::fmt;
use std::str::FromStr;

use super::{MachineError, MachineSpec, Move, Rule, StateId, StateSet, Symbol};

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{{}}}{},{{{}}}{},{}",
            self.before_state,
            self.input_symbol,
            self.after_state,
            self.output_symbol,
            self.movement.marker()
        )
    }
}

impl fmt::Display for StateSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, state) in self.as_slice().iter().enumerate() {
            if i != 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", state)?;
        }
        f.write_str("]")
    }
}

impl fmt::Display for MachineSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_machine(f, self, usize::MAX)
    }
}

impl MachineSpec {
    /// Text form listing at most `limit` rules
    pub fn summary(&self, limit: usize) -> String {
        struct Summary<'a>(&'a MachineSpec, usize);

        impl fmt::Display for Summary<'_> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write_machine(f, self.0, self.1)
            }
        }

        Summary(self, limit).to_string()
    }
}

fn write_machine(f: &mut fmt::Formatter<'_>, machine: &MachineSpec, limit: usize) -> fmt::Result {
    writeln!(f, "machine:")?;
    writeln!(f, "  accept: {}", machine.accept_states())?;
    writeln!(f, "  reject: {}", machine.reject_states())?;
    for (i, rule) in machine.rules().iter().take(limit).enumerate() {
        writeln!(f, "  #{}: {}", i, rule)?;
    }
    if machine.rules().len() > limit {
        writeln!(f, "  and {} more rules...", machine.rules().len() - limit)?;
    }
    Ok(())
}

impl FromStr for MachineSpec {
    type Err = MachineError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let mut lines = input
            .lines()
            .enumerate()
            .map(|(idx, line)| (idx + 1, line.trim()))
            .filter(|(_, line)| !line.is_empty());

        let (line_no, header) = lines.next().ok_or_else(|| parse_error(1, "empty description"))?;
        if header != "machine:" {
            return Err(parse_error(line_no, "expected `machine:` header"));
        }

        let (line_no, accept) = lines
            .next()
            .ok_or_else(|| parse_error(line_no + 1, "missing accept list"))?;
        let accept_states = parse_state_list(line_no, accept, "accept:")?;

        let (line_no, reject) = lines
            .next()
            .ok_or_else(|| parse_error(line_no + 1, "missing reject list"))?;
        let reject_states = parse_state_list(line_no, reject, "reject:")?;

        let mut builder = MachineSpec::builder()
            .accept_states(accept_states)
            .reject_states(reject_states);

        for (expected, (line_no, line)) in lines.enumerate() {
            let (label, body) = line
                .split_once(':')
                .ok_or_else(|| parse_error(line_no, "expected `#n: rule`"))?;
            let index = label
                .strip_prefix('#')
                .and_then(|n| n.parse::<usize>().ok())
                .ok_or_else(|| parse_error(line_no, format!("invalid rule label `{}`", label)))?;
            if index != expected {
                return Err(parse_error(
                    line_no,
                    format!("rule #{} out of sequence, expected #{}", index, expected),
                ));
            }
            builder = builder.push_rule(parse_rule(line_no, body.trim())?);
        }

        builder.build()
    }
}

fn parse_error(line: usize, message: impl Into<String>) -> MachineError {
    MachineError::Parse {
        line,
        message: message.into(),
    }
}

fn parse_state_list(line_no: usize, line: &str, key: &str) -> Result<Vec<StateId>, MachineError> {
    let list = line
        .strip_prefix(key)
        .map(str::trim)
        .and_then(|rest| rest.strip_prefix('['))
        .and_then(|rest| rest.strip_suffix(']'))
        .ok_or_else(|| parse_error(line_no, format!("expected `{} [..]`", key)))?;

    if list.trim().is_empty() {
        return Ok(Vec::new());
    }

    list.split(',')
        .map(|item| {
            item.trim()
                .parse::<StateId>()
                .map_err(|_| parse_error(line_no, format!("invalid state `{}`", item.trim())))
        })
        .collect()
}

/// Decode `{before}input,{after}output,dir`
fn parse_rule(line_no: usize, body: &str) -> Result<Rule, MachineError> {
    let mut parts = body.split(',');
    let (before_state, input_symbol) = parse_state_symbol(line_no, parts.next())?;
    let (after_state, output_symbol) = parse_state_symbol(line_no, parts.next())?;

    let dir = parts
        .next()
        .map(str::trim)
        .ok_or_else(|| parse_error(line_no, "missing direction"))?;
    let mut dir_chars = dir.chars();
    let movement = match (dir_chars.next(), dir_chars.next()) {
        (Some(marker), None) => Move::from_marker(marker),
        _ => return Err(parse_error(line_no, format!("invalid direction `{}`", dir))),
    };
    if parts.next().is_some() {
        return Err(parse_error(line_no, "trailing fields after direction"));
    }

    Ok(Rule::new(
        before_state,
        input_symbol,
        after_state,
        output_symbol,
        movement,
    ))
}

fn parse_state_symbol(line_no: usize, part: Option<&str>) -> Result<(StateId, Symbol), MachineError> {
    let part = part
        .map(str::trim)
        .ok_or_else(|| parse_error(line_no, "missing `{state}symbol` field"))?;
    let (state, symbol) = part
        .strip_prefix('{')
        .and_then(|rest| rest.split_once('}'))
        .ok_or_else(|| parse_error(line_no, format!("expected `{{state}}symbol`, got `{}`", part)))?;
    let state = state
        .parse::<StateId>()
        .map_err(|_| parse_error(line_no, format!("invalid state `{}`", state)))?;

    let mut chars = symbol.chars();
    match (chars.next(), chars.next()) {
        (Some(symbol), None) => Ok((state, symbol)),
        _ => Err(parse_error(line_no, format!("expected one symbol, got `{}`", symbol))),
    }
}
