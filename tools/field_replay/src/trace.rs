use std::{fs, path::Path};

use anyhow::{anyhow, bail, Context, Result};
use hidtouch::touch::usage;
use hidtouch::{FieldKind, InputEvent};

/// One line of a captured field trace.
///
/// ```text
/// field,<ms>,<contact_id|touch|x|y|0xUSAGE>,<value>
/// poll,<ms>
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TraceStep {
    Field {
        ms: u64,
        kind: FieldKind,
        value: i32,
    },
    Poll {
        ms: u64,
    },
}

impl TraceStep {
    pub fn ms(&self) -> u64 {
        match self {
            Self::Field { ms, .. } | Self::Poll { ms } => *ms,
        }
    }
}

pub fn read_trace(path: &Path) -> Result<Vec<TraceStep>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed reading trace {}", path.display()))?;
    parse_trace(&raw).with_context(|| format!("invalid trace {}", path.display()))
}

pub fn parse_trace(raw: &str) -> Result<Vec<TraceStep>> {
    let mut steps = Vec::new();
    for (idx, line) in raw.lines().enumerate() {
        let line_no = idx + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let step = parse_step(trimmed).with_context(|| format!("line {line_no}: {trimmed}"))?;
        steps.push(step);
    }
    Ok(steps)
}

fn parse_step(line: &str) -> Result<TraceStep> {
    let parts: Vec<&str> = line.split(',').map(str::trim).collect();
    match parts.as_slice() {
        ["field", ms, kind, value] => Ok(TraceStep::Field {
            ms: parse_ms(ms)?,
            kind: parse_kind(kind)?,
            value: value
                .parse::<i32>()
                .with_context(|| format!("invalid value '{value}'"))?,
        }),
        ["poll", ms] => Ok(TraceStep::Poll { ms: parse_ms(ms)? }),
        [tag, ..] => bail!("unknown record '{tag}'"),
        [] => bail!("empty record"),
    }
}

fn parse_ms(raw: &str) -> Result<u64> {
    raw.parse::<u64>()
        .with_context(|| format!("invalid timestamp '{raw}'"))
}

fn parse_kind(raw: &str) -> Result<FieldKind> {
    match raw.to_ascii_lowercase().as_str() {
        "contact_id" => Ok(FieldKind::ContactIdentifier),
        "touch" => Ok(FieldKind::Touch),
        "x" => Ok(FieldKind::CoordinateX),
        "y" => Ok(FieldKind::CoordinateY),
        other => {
            let hex = other
                .strip_prefix("0x")
                .ok_or_else(|| anyhow!("unknown field kind '{raw}'"))?;
            let code = u32::from_str_radix(hex, 16)
                .with_context(|| format!("invalid usage code '{raw}'"))?;
            Ok(usage::field_kind(code))
        }
    }
}

/// Printed form of an emitted event; expectation files use the same form.
pub fn event_line(event: &InputEvent) -> String {
    match *event {
        InputEvent::KeyTouch(down) => format!("key_touch,{}", down as u8),
        InputEvent::PosX(value) => format!("pos_x,{value}"),
        InputEvent::PosY(value) => format!("pos_y,{value}"),
        InputEvent::PosXSlot { slot, value } => format!("mt_pos_x,{slot},{value}"),
        InputEvent::PosYSlot { slot, value } => format!("mt_pos_y,{slot},{value}"),
        InputEvent::TrackingId { slot, id } => format!("tracking_id,{slot},{id}"),
        InputEvent::TouchMajor(value) => format!("touch_major,{value}"),
        InputEvent::SlotState { slot, touching } => format!("slot,{slot},{}", touching as u8),
        InputEvent::ContactSync => "mt_sync".to_string(),
        InputEvent::SyncFrame => "sync".to_string(),
    }
}

pub fn read_expected(path: &Path) -> Result<Vec<String>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed reading expectations {}", path.display()))?;
    Ok(parse_expected(&raw))
}

pub fn parse_expected(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(|line| line.split(',').map(str::trim).collect::<Vec<_>>().join(","))
        .collect()
}
