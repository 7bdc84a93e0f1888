//! Parser for the formation block language.
//!
//! ```text
//! # Tank Spearhead | difficulty=3 | probability=0.15 + 0.05 * wave | minWave=3 | gap=1.2
//! tank @0 y=590 color=blue
//! swarm @0.5 y=540 color=auto group=4 spacing=30   # trailing comment
//! ---
//! ```

use chroma_core::enums::{EnemyArchetype, TowerColor};
use chroma_core::error::ConfigError;

use super::expr::Expr;

/// Color of a spawned enemy: fixed by the template or drawn from the wave color curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSpec {
    Fixed(TowerColor),
    Auto,
}

/// One member line of a template.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberSpec {
    /// Seconds after the template starts.
    pub time: f64,
    pub archetype: EnemyArchetype,
    pub color: ColorSpec,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub group: Option<u32>,
    pub spacing: Option<f64>,
    pub offsets: Vec<f64>,
}

#[derive(Debug, Clone)]
pub struct FormationTemplate {
    pub id: String,
    pub label: String,
    pub difficulty: u32,
    /// `None` weighs the template at 1.
    pub probability: Option<Expr>,
    pub min_wave: u32,
    /// Pause after this template; falls back to the configured default.
    pub gap: Option<f64>,
    pub members: Vec<MemberSpec>,
}

impl FormationTemplate {
    /// Latest member time offset.
    pub fn duration(&self) -> f64 {
        self.members.iter().map(|m| m.time.max(0.0)).fold(0.0, f64::max)
    }
}

struct PendingBlock {
    header: Header,
    members: Vec<MemberSpec>,
}

struct Header {
    id: String,
    label: String,
    difficulty: Option<u32>,
    probability: Option<Expr>,
    min_wave: Option<u32>,
    gap: Option<f64>,
}

/// Parse formation definitions. Blocks without members are dropped.
pub fn parse_definitions(text: &str) -> Result<Vec<FormationTemplate>, ConfigError> {
    let mut templates = Vec::new();
    let mut current: Option<PendingBlock> = None;
    let mut unnamed = 0u32;

    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        if line == "---" {
            finish_block(current.take(), &mut templates);
            continue;
        }
        if let Some(header) = line.strip_prefix('#') {
            finish_block(current.take(), &mut templates);
            let header = parse_header(header, &mut unnamed).map_err(|message| ConfigError::Formation {
                line: line_no,
                message,
            })?;
            current = Some(PendingBlock {
                header,
                members: Vec::new(),
            });
            continue;
        }
        // Member lines outside a block are ignored.
        let Some(block) = current.as_mut() else {
            continue;
        };
        if let Some(member) = parse_member(line).map_err(|message| ConfigError::Formation {
            line: line_no,
            message,
        })? {
            block.members.push(member);
        }
    }
    finish_block(current.take(), &mut templates);
    Ok(templates)
}

fn finish_block(block: Option<PendingBlock>, out: &mut Vec<FormationTemplate>) {
    let Some(PendingBlock { header, members }) = block else {
        return;
    };
    if members.is_empty() {
        return;
    }
    let difficulty = header
        .difficulty
        .filter(|d| *d > 0)
        .unwrap_or(members.len() as u32);
    out.push(FormationTemplate {
        id: header.id,
        label: header.label,
        difficulty,
        probability: header.probability,
        min_wave: header.min_wave.unwrap_or(1).max(1),
        gap: header.gap,
        members,
    });
}

fn slug(label: &str) -> String {
    let mut out = String::with_capacity(label.len());
    let mut dash = false;
    for c in label.chars() {
        if c.is_ascii_alphanumeric() {
            if dash && !out.is_empty() {
                out.push('-');
            }
            dash = false;
            out.push(c.to_ascii_lowercase());
        } else {
            dash = true;
        }
    }
    out
}

fn parse_header(content: &str, unnamed: &mut u32) -> Result<Header, String> {
    let mut segments = content.split('|').map(str::trim).filter(|s| !s.is_empty());
    let label = segments.next().unwrap_or("").to_string();
    let id = match slug(&label) {
        s if s.is_empty() => {
            *unnamed += 1;
            format!("formation-{unnamed}")
        }
        s => s,
    };
    let mut header = Header {
        id,
        label,
        difficulty: None,
        probability: None,
        min_wave: None,
        gap: None,
    };
    for segment in segments {
        let Some((key, value)) = segment.split_once('=') else {
            continue;
        };
        let value = value.trim();
        match key.trim().to_ascii_lowercase().as_str() {
            "difficulty" => {
                header.difficulty = value
                    .parse::<f64>()
                    .ok()
                    .filter(|d| d.is_finite() && *d > 0.0)
                    .map(|d| d.round() as u32);
            }
            "probability" => {
                header.probability = Some(Expr::parse(value).map_err(|e| e.to_string())?);
            }
            "minwave" => {
                header.min_wave = value
                    .parse::<f64>()
                    .ok()
                    .filter(|w| w.is_finite())
                    .map(|w| w.floor().max(1.0) as u32);
            }
            "gap" => {
                header.gap = value.parse::<f64>().ok().filter(|g| g.is_finite());
            }
            _ => {}
        }
    }
    Ok(header)
}

fn parse_number(key: &str, value: &str) -> Result<f64, String> {
    value
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| format!("`{key}` expects a number, found `{value}`"))
}

fn parse_member(line: &str) -> Result<Option<MemberSpec>, String> {
    let line = match line.find(" #").or_else(|| line.find("\t#")) {
        Some(pos) => line[..pos].trim(),
        None => line,
    };
    let mut tokens = line.split_whitespace();
    let Some(kind) = tokens.next() else {
        return Ok(None);
    };
    let archetype = EnemyArchetype::parse(kind).ok_or_else(|| format!("unknown archetype `{kind}`"))?;

    let mut member = MemberSpec {
        time: 0.0,
        archetype,
        color: ColorSpec::Auto,
        x: None,
        y: None,
        group: None,
        spacing: None,
        offsets: Vec::new(),
    };
    for token in tokens {
        if let Some(time) = token.strip_prefix('@') {
            member.time = parse_number("@", time)?.max(0.0);
            continue;
        }
        let Some((key, value)) = token.split_once('=') else {
            continue;
        };
        match key.to_ascii_lowercase().as_str() {
            "x" => member.x = Some(parse_number(key, value)?),
            "y" => member.y = Some(parse_number(key, value)?),
            "color" => {
                member.color = match value.to_ascii_lowercase().as_str() {
                    "auto" | "random" => ColorSpec::Auto,
                    other => ColorSpec::Fixed(
                        TowerColor::parse(other).ok_or_else(|| format!("unknown color `{value}`"))?,
                    ),
                };
            }
            "group" | "groupsize" => {
                member.group = Some(parse_number(key, value)?.floor().max(1.0) as u32);
            }
            "spacing" => member.spacing = Some(parse_number(key, value)?),
            "offset" => member.offsets.push(parse_number(key, value)?),
            _ => {}
        }
    }
    Ok(Some(member))
}
