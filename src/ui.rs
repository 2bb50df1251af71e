//! TUI rendering module.
//!
//! Layout, top to bottom:
//! - header with stage, score, mistakes and both timers
//! - the game board (strands, ribosome) with a side panel (toolbox or tRNA pool)
//! - the last game message, coloured by kind
//! - a status bar with the input mode

pub mod glyphs;

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
    Frame,
};

use crate::app::{AppMode, AppState, Game};
use crate::engine::{MessageKind, Simulation};
use crate::genetic_code::AminoAcid;
use crate::model::Base;
use crate::replication::{ReplicationGame, Strand};
use crate::ribosome::Site;
use crate::stage::{Stage, SynthesisStage};
use crate::synthesis::SynthesisGame;
use glyphs::Glyphs;

const HEADER_HEIGHT: u16 = 3;
const MESSAGE_HEIGHT: u16 = 3;
const STATUS_BAR_HEIGHT: u16 = 1;
/// Width of the toolbox / tRNA pool panel.
const SIDE_PANEL_WIDTH: u16 = 26;
/// Label column in front of each strand.
const LABEL_WIDTH: usize = 10;

const HELP_TEXT: &str = "\
Replication: press 1-4 to select enzymes from the toolbox, then Enter to deploy them. \
Only the one enzyme the current step needs may be selected. While polymerase works, \
type A, C, G or T to place the nucleotide pairing with the highlighted template base.\n\
\n\
Synthesis: type A, C, G or U to build the mRNA against the DNA template. During \
translation move in the tRNA pool with j/k and press Enter to bring the highlighted \
tRNA to the A-site. Its anticodon must pair with the codon under the A-site.\n\
\n\
h/l move the slot cursor, r restarts with a new sequence, :q or Ctrl+C quits.\n\
\n\
Press any key to close this help.";

/// Colour scheme for sequence letters.
pub trait ColorScheme {
    fn get_color(&self, c: char) -> Color;
}

/// Nucleotide colours, shared by DNA and RNA.
pub struct NucleotideColorScheme;

impl ColorScheme for NucleotideColorScheme {
    fn get_color(&self, c: char) -> Color {
        match c.to_ascii_uppercase() {
            'A' => Color::Red,
            'C' => Color::Green,
            'G' => Color::Yellow,
            'T' => Color::Blue,
            'U' => Color::Magenta,
            _ => Color::DarkGray,
        }
    }
}

/// Amino acid colours grouped by side chain.
pub struct AminoAcidColorScheme;

impl ColorScheme for AminoAcidColorScheme {
    fn get_color(&self, c: char) -> Color {
        match c.to_ascii_uppercase() {
            // Hydrophobic
            'A' | 'V' | 'I' | 'L' | 'M' | 'F' | 'W' | 'P' => Color::Yellow,
            // Polar
            'S' | 'T' | 'N' | 'Q' | 'C' | 'G' | 'Y' => Color::Green,
            // Charged positive
            'K' | 'R' | 'H' => Color::Blue,
            // Charged negative
            'D' | 'E' => Color::Red,
            '*' => Color::DarkGray,
            _ => Color::Gray,
        }
    }
}

/// Renders the complete UI.
pub fn render(frame: &mut Frame, state: &AppState, glyphs: &Glyphs) {
    let area = frame.area();

    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(HEADER_HEIGHT),
            Constraint::Min(8),
            Constraint::Length(MESSAGE_HEIGHT),
            Constraint::Length(STATUS_BAR_HEIGHT),
        ])
        .split(area);

    let body_layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(20), Constraint::Length(SIDE_PANEL_WIDTH)])
        .split(main_layout[1]);

    render_header(frame, state, main_layout[0]);
    match &state.game {
        Game::Replication(game) => {
            render_replication(frame, game, state.slot_cursor, glyphs, body_layout[0]);
            render_toolbox(frame, game, glyphs, body_layout[1]);
        }
        Game::Synthesis(game) => {
            render_synthesis(frame, game, state.slot_cursor, glyphs, body_layout[0]);
            render_pool(frame, game, state.pool_cursor, glyphs, body_layout[1]);
        }
    }
    render_message(frame, state, main_layout[2]);
    render_status_bar(frame, state, main_layout[3]);

    if state.show_help {
        render_help(frame, area);
    }
}

fn render_header(frame: &mut Frame, state: &AppState, area: Rect) {
    let score = state.game.score();
    let stage_style = if score.stage_time_remaining <= 5 {
        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White)
    };

    let line = Line::from(vec![
        Span::styled(
            format!(" {} ", state.game.stage_label()),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw("| Score: "),
        Span::styled(score.score.to_string(), Style::default().fg(Color::Green)),
        Span::raw(" | Mistakes: "),
        Span::styled(score.mistakes.to_string(), Style::default().fg(Color::Red)),
        Span::raw(" | Stage: "),
        Span::styled(format!("{:>2}s", score.stage_time_remaining), stage_style),
        Span::raw(format!(
            " | Time: {:02}:{:02}",
            score.global_elapsed / 60,
            score.global_elapsed % 60
        )),
    ]);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(state.game.title());
    frame.render_widget(Paragraph::new(line).block(block), area);
}

fn base_span(base: Base) -> Span<'static> {
    let color = NucleotideColorScheme.get_color(base.as_char());
    Span::styled(
        base.to_string(),
        Style::default().fg(Color::Black).bg(color),
    )
}

fn label(text: &str) -> Span<'static> {
    Span::styled(
        format!("{text:<LABEL_WIDTH$}"),
        Style::default().fg(Color::Gray),
    )
}

/// A full strand, two columns per base.
fn sequence_line(name: &str, bases: &[Base]) -> Line<'static> {
    let mut spans = vec![label(name)];
    for &base in bases {
        spans.push(Span::raw(" "));
        spans.push(base_span(base));
    }
    Line::from(spans)
}

/// Bonds between two paired strands.
fn bond_line(bases: &[Base], glyphs: &Glyphs) -> Line<'static> {
    let mut spans = vec![label("")];
    for base in bases {
        spans.push(Span::raw(" "));
        spans.push(Span::styled(
            glyphs.bond(base.hydrogen_bonds()),
            Style::default().fg(Color::DarkGray),
        ));
    }
    Line::from(spans)
}

/// A strand under construction: filled bases, empty slots and primers.
fn slot_line(
    name: &str,
    filled: impl Iterator<Item = Option<Base>>,
    primers: &[usize],
    glyphs: &Glyphs,
) -> Line<'static> {
    let mut spans = vec![label(name)];
    for (index, value) in filled.enumerate() {
        if primers.contains(&index) {
            spans.push(Span::styled(
                glyphs.primer,
                Style::default().fg(Color::Black).bg(Color::LightRed),
            ));
        } else {
            spans.push(Span::raw(" "));
        }
        match value {
            Some(base) => spans.push(base_span(base)),
            None => spans.push(Span::styled(
                glyphs.empty_slot,
                Style::default().fg(Color::DarkGray),
            )),
        }
    }
    Line::from(spans)
}

fn cursor_line(cursor: usize, target: Option<usize>, glyphs: &Glyphs) -> Line<'static> {
    let mut text = " ".repeat(LABEL_WIDTH + 2 * cursor + 1);
    text.push_str(glyphs.cursor);
    let style = if target == Some(cursor) {
        Style::default().fg(Color::Green)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    Line::from(Span::styled(text, style))
}

fn render_replication(
    frame: &mut Frame,
    game: &ReplicationGame,
    cursor: usize,
    glyphs: &Glyphs,
    area: Rect,
) {
    let template = game.template().bases();
    let lagging_template = game.lagging_template().bases();
    let mut lines: Vec<Line> = vec![sequence_line("Template", template)];

    if !game.is_unzipped() {
        lines.push(bond_line(template, glyphs));
    } else {
        for strand in [Strand::Leading, Strand::Lagging] {
            let ledger = game.ledger(strand);
            let visible = game.is_sealed() || game.active_strand().map_or(true, |s| s == strand);
            if !visible {
                lines.push(Line::from(""));
                continue;
            }
            if strand == Strand::Leading && game.is_sealed() {
                lines.push(bond_line(template, glyphs));
            }
            lines.push(slot_line(
                &format!("{strand}"),
                ledger.slots().iter().map(|slot| slot.filled),
                &game.primer_positions(strand),
                glyphs,
            ));
            if game.engaged() == Some(strand) {
                let target = ledger.current_target().map(|slot| slot.index);
                lines.push(cursor_line(cursor, target, glyphs));
            }
            if strand == Strand::Lagging && game.is_sealed() {
                lines.push(bond_line(lagging_template, glyphs));
            }
            if strand == Strand::Leading {
                lines.push(Line::from(Span::styled(
                    glyphs.h_separator.repeat(LABEL_WIDTH + 2 * template.len() + 1),
                    Style::default().fg(Color::DarkGray),
                )));
            }
        }
    }
    lines.push(sequence_line("Template", lagging_template));

    let block = Block::default()
        .borders(Borders::ALL)
        .title(game.stage().instruction());
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_toolbox(frame: &mut Frame, game: &ReplicationGame, glyphs: &Glyphs, area: Rect) {
    let items: Vec<ListItem> = game
        .toolbox()
        .iter()
        .enumerate()
        .map(|(position, &enzyme)| {
            let selected = game.selection().contains(enzyme);
            let mark = if selected {
                glyphs.selected
            } else {
                glyphs.unselected
            };
            let style = if selected {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            ListItem::new(Line::from(Span::styled(
                format!("{} {mark} {enzyme}", position + 1),
                style,
            )))
        })
        .collect();

    let title = if game.is_busy() {
        "Toolbox (working...)"
    } else {
        "Toolbox (Enter deploys)"
    };
    let list = List::new(items).block(Block::default().borders(Borders::ALL).title(title));
    frame.render_widget(list, area);
}

fn render_synthesis(
    frame: &mut Frame,
    game: &SynthesisGame,
    cursor: usize,
    glyphs: &Glyphs,
    area: Rect,
) {
    let mut lines: Vec<Line> = Vec::new();

    match game.stage() {
        SynthesisStage::Transcription => {
            let template = game.template().bases();
            lines.push(sequence_line("DNA", template));
            lines.push(bond_line(template, glyphs));
            let transcript = game.transcript();
            lines.push(slot_line(
                "mRNA",
                transcript.slots().iter().map(|slot| slot.filled),
                &[],
                glyphs,
            ));
            let target = transcript.current_target().map(|slot| slot.index);
            if target.is_some() {
                lines.push(cursor_line(cursor, target, glyphs));
            }
        }
        SynthesisStage::Translation | SynthesisStage::Complete => {
            if let Some(ribosome) = game.ribosome() {
                let mut spans = vec![label("mRNA")];
                for (index, codon) in ribosome.codons().iter().enumerate() {
                    spans.push(Span::raw(" "));
                    let under_a_site =
                        index == ribosome.reading_position() && !ribosome.is_finished();
                    for base in codon.bases() {
                        let span = base_span(base);
                        spans.push(if under_a_site {
                            span.patch_style(
                                Style::default().add_modifier(Modifier::UNDERLINED | Modifier::BOLD),
                            )
                        } else {
                            span
                        });
                    }
                }
                lines.push(Line::from(spans));
                lines.push(Line::from(""));

                let mut sites = vec![label("Ribosome")];
                for site in Site::ALL {
                    let occupant = ribosome
                        .site(site)
                        .map_or_else(|| "-".to_string(), |trna| trna.to_string());
                    sites.push(Span::styled(
                        format!("[{}: {occupant}] ", site.label()),
                        Style::default().fg(Color::Cyan),
                    ));
                }
                lines.push(Line::from(sites));
                lines.push(Line::from(""));

                let mut chain = vec![label("Protein")];
                for (i, &residue) in game.protein().iter().enumerate() {
                    if i > 0 {
                        chain.push(Span::raw(glyphs.peptide_bond));
                    }
                    chain.push(residue_span(residue));
                }
                lines.push(Line::from(chain));
            }
        }
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .title(game.stage().instruction());
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn residue_span(residue: AminoAcid) -> Span<'static> {
    let color = AminoAcidColorScheme.get_color(residue.letter());
    Span::styled(
        residue.short_name(),
        Style::default().fg(Color::Black).bg(color),
    )
}

fn render_pool(
    frame: &mut Frame,
    game: &SynthesisGame,
    cursor: usize,
    glyphs: &Glyphs,
    area: Rect,
) {
    let items: Vec<ListItem> = game
        .pool()
        .iter()
        .map(|trna| {
            let color = AminoAcidColorScheme.get_color(trna.amino_acid.letter());
            ListItem::new(Line::from(vec![
                Span::styled(
                    format!("{:<4}", trna.amino_acid.short_name()),
                    Style::default().fg(color),
                ),
                Span::raw(format!("{} {}", glyphs.arrow_right, trna.anticodon)),
            ]))
        })
        .collect();

    let mut list_state = ListState::default();
    if !items.is_empty() {
        list_state.select(Some(cursor.min(items.len() - 1)));
    }
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title("tRNA pool"))
        .highlight_style(Style::default().bg(Color::White).fg(Color::Black));
    frame.render_stateful_widget(list, area, &mut list_state);
}

fn render_message(frame: &mut Frame, state: &AppState, area: Rect) {
    let (text, style) = match &state.message {
        Some((text, kind)) => {
            let color = match kind {
                MessageKind::Info => Color::White,
                MessageKind::Error => Color::Red,
                MessageKind::Success => Color::Green,
            };
            (text.as_str(), Style::default().fg(color))
        }
        None => (state.game.instruction(), Style::default()),
    };
    let paragraph = Paragraph::new(Line::from(Span::styled(text.to_string(), style)))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(paragraph, area);
}

fn render_status_bar(frame: &mut Frame, state: &AppState, area: Rect) {
    let (mode_str, command_str) = match &state.mode {
        AppMode::Normal => ("NORMAL", String::new()),
        AppMode::Command(cmd) => ("COMMAND", format!(":{cmd}")),
    };

    let hint = if state.game.is_complete() {
        "r: play again | ?: help | :q quit "
    } else {
        "?: help | r: restart | :q quit "
    };
    let left_content = if command_str.is_empty() {
        format!(" {mode_str} | {}", state.history.back().map_or("", |s| s.as_str()))
    } else {
        format!(" {mode_str} | {command_str}")
    };

    let left_len = left_content.chars().count();
    let status_line = Line::from(vec![
        Span::styled(left_content, Style::default().fg(Color::Black).bg(Color::Cyan)),
        Span::styled(
            " ".repeat((area.width as usize).saturating_sub(left_len + hint.len())),
            Style::default().bg(Color::Cyan),
        ),
        Span::styled(
            hint,
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
    ]);
    frame.render_widget(Paragraph::new(status_line), area);
}

fn render_help(frame: &mut Frame, area: Rect) {
    let popup = centered_rect(area, 70, 60);
    let width = popup.width.saturating_sub(4).max(20) as usize;
    let lines: Vec<Line> = HELP_TEXT
        .lines()
        .flat_map(|paragraph| {
            if paragraph.is_empty() {
                vec![Line::from("")]
            } else {
                textwrap::wrap(paragraph, width)
                    .into_iter()
                    .map(|line| Line::from(line.into_owned()))
                    .collect()
            }
        })
        .collect();

    frame.render_widget(Clear, popup);
    let block = Block::default().borders(Borders::ALL).title("Help");
    frame.render_widget(Paragraph::new(lines).block(block), popup);
}

/// A rectangle of `percent_x` by `percent_y` centred in `area`.
fn centered_rect(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let width = area.width * percent_x / 100;
    let height = area.height * percent_y / 100;
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
