//! Position assignment handlers.

use serde::Serialize;
use tabled::Tabled;

use lumen_core::view::{LightCard, position_board, slot_lights};
use lumen_core::{Command as CoreCommand, CommandResult, Controller, Position, PositionMap};

use crate::cli::{GlobalOpts, PositionsArgs, PositionsCommand};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct CardRow {
    #[tabled(rename = "Light")]
    name: String,
    #[tabled(rename = "Enabled")]
    enabled: &'static str,
    #[tabled(rename = "Position")]
    position: String,
    #[tabled(rename = "Label")]
    label: String,
}

impl From<&LightCard> for CardRow {
    fn from(c: &LightCard) -> Self {
        Self {
            name: c.name.clone(),
            enabled: if c.enabled { "yes" } else { "no" },
            position: c.position.to_string(),
            label: c.label.clone(),
        }
    }
}

/// One screen slot with the enabled lights that feed it.
#[derive(Debug, Serialize)]
struct SlotSummary {
    position: Position,
    label: String,
    lights: Vec<String>,
}

#[derive(Tabled)]
struct SlotRow {
    #[tabled(rename = "Slot")]
    position: String,
    #[tabled(rename = "Label")]
    label: String,
    #[tabled(rename = "Count")]
    count: usize,
    #[tabled(rename = "Lights")]
    lights: String,
}

impl From<&SlotSummary> for SlotRow {
    fn from(s: &SlotSummary) -> Self {
        Self {
            position: s.position.to_string(),
            label: s.label.clone(),
            count: s.lights.len(),
            lights: s.lights.join(", "),
        }
    }
}

/// The eight screen slots followed by the special ones in catalogue order.
fn slot_summaries(map: &PositionMap) -> Vec<SlotSummary> {
    let board = position_board(map);
    let directional = board.slot_counts.iter().map(|slot| SlotSummary {
        position: slot.position,
        label: map.label(slot.position).to_owned(),
        lights: slot_lights(map, slot.position)
            .into_iter()
            .map(str::to_owned)
            .collect(),
    });
    let specials = board.specials.iter().map(|card| SlotSummary {
        position: card.position,
        label: card.label.clone(),
        lights: card.lights.clone(),
    });
    directional.chain(specials).collect()
}

fn print_cards(map: &PositionMap, global: &GlobalOpts) {
    let board = position_board(map);
    let out = output::render_list(
        &global.output,
        &board.cards,
        |c| CardRow::from(c),
        |c| c.name.clone(),
    );
    output::print_output(&out, global.quiet);
}

fn show_detail(summary: &SlotSummary) -> String {
    if summary.lights.is_empty() {
        format!("{} ({}): no lights", summary.label, summary.position)
    } else {
        let mut out = format!("{} ({}):", summary.label, summary.position);
        for light in &summary.lights {
            out.push_str("\n  ");
            out.push_str(light);
        }
        out
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    controller: &Controller,
    args: PositionsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        PositionsCommand::List => {
            let map = controller.load_positions().await?;
            print_cards(&map, global);
            Ok(())
        }

        PositionsCommand::Slots => {
            let map = controller.load_positions().await?;
            let summaries = slot_summaries(&map);
            let out = output::render_list(
                &global.output,
                &summaries,
                |s| SlotRow::from(s),
                |s| format!("{}\t{}", s.position, s.lights.len()),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        PositionsCommand::Set { light, position } => {
            let position = util::parse_position(&position)?;
            let message =
                util::edit_positions(controller, &light, |map| map.assign(&light, position))
                    .await?;
            if !global.quiet {
                eprintln!("{message}");
            }
            Ok(())
        }

        PositionsCommand::Enable { light } => {
            let message = util::edit_positions(controller, &light, |map| {
                map.set_enabled(&light, true)
            })
            .await?;
            if !global.quiet {
                eprintln!("{message}");
            }
            Ok(())
        }

        PositionsCommand::Disable { light } => {
            let message = util::edit_positions(controller, &light, |map| {
                map.set_enabled(&light, false)
            })
            .await?;
            if !global.quiet {
                eprintln!("{message}");
            }
            Ok(())
        }

        PositionsCommand::Show { position } => {
            let position = util::parse_position(&position)?;
            let map = controller.load_positions().await?;
            let summary = SlotSummary {
                position,
                label: map.label(position).to_owned(),
                lights: slot_lights(&map, position)
                    .into_iter()
                    .map(str::to_owned)
                    .collect(),
            };
            let out = output::render_single(&global.output, &summary, show_detail, |s| {
                s.lights.join("\n")
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        PositionsCommand::Reset => {
            if !util::confirm(
                "Reset all light positions to the server defaults?",
                "positions reset",
                global.yes,
            )? {
                return Ok(());
            }
            let result = controller.execute(CoreCommand::ResetPositions).await?;
            if !global.quiet {
                eprintln!("{}", result.summary());
            }
            if let CommandResult::PositionsReset(map) = result {
                print_cards(&map, global);
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_core::{LightAssignment, PositionSlot};

    fn map() -> PositionMap {
        PositionMap {
            lights: vec![
                LightAssignment::new("Strip", true, Position::Left),
                LightAssignment::new("Lamp", true, Position::Ambient),
            ],
            slots: vec![
                PositionSlot {
                    id: Position::Left,
                    label: "Left".into(),
                    description: String::new(),
                },
                PositionSlot {
                    id: Position::Ambient,
                    label: "Ambient".into(),
                    description: String::new(),
                },
            ],
        }
    }

    #[test]
    fn summaries_list_directional_then_specials() {
        let summaries = slot_summaries(&map());
        assert_eq!(summaries.len(), 9);
        assert_eq!(summaries[0].position, Position::Left);
        assert_eq!(summaries[0].lights, ["Strip"]);
        let last = summaries.last().map(|s| (s.position, s.lights.clone()));
        assert_eq!(last, Some((Position::Ambient, vec!["Lamp".to_owned()])));
    }

    #[test]
    fn empty_slot_detail_says_so() {
        let summary = SlotSummary {
            position: Position::Top,
            label: "Not set".into(),
            lights: Vec::new(),
        };
        assert_eq!(show_detail(&summary), "Not set (top): no lights");
    }
}
