// ===== cipherforge/src/reports/mod.rs =====
use cipherforge::alphabet::Alphabet;
use cipherforge::generator::{BlockRecord, GeneratorState};
use cipherforge::mapping::Mapping;
use cipherforge::permutation::Permutation;
use cipherforge::pipeline::{HighScoresSummary, StatsSnapshot};
use comfy_table::presets::ASCII_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

fn key_value_table(title: &str) -> Table {
    let mut table = Table::new();
    table
        .load_preset(ASCII_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new(title).add_attribute(Attribute::Bold),
        Cell::new("Value").add_attribute(Attribute::Bold),
    ]);
    if let Some(col) = table.column_mut(1) {
        col.set_cell_alignment(CellAlignment::Right);
    }
    table
}

pub fn print_run_report(snap: &StatsSnapshot) {
    let mut table = key_value_table("Run");
    let secs = snap.elapsed.as_secs_f64();
    let avg = if secs > 0.0 {
        snap.total_mappings as f64 / secs
    } else {
        0.0
    };

    table.add_row(vec![
        Cell::new("Mappings processed"),
        Cell::new(snap.total_mappings).fg(Color::Cyan),
    ]);
    if snap.skipped_mappings > 0 {
        table.add_row(vec![
            Cell::new("Mappings skipped"),
            Cell::new(snap.skipped_mappings).fg(Color::Red),
        ]);
    }
    table.add_row(vec![Cell::new("Words validated"), Cell::new(snap.total_words)]);
    table.add_row(vec![
        Cell::new("Highest score"),
        Cell::new(format!("{:.2}", snap.highest_score)).fg(Color::Green),
    ]);
    table.add_row(vec![
        Cell::new("High scores logged"),
        Cell::new(snap.high_score_count),
    ]);
    table.add_row(vec![
        Cell::new("Elapsed"),
        Cell::new(format!("{:.1}s", secs)),
    ]);
    table.add_row(vec![
        Cell::new("Mappings / sec"),
        Cell::new(format!("{:.1}", avg)),
    ]);
    if let Some(p) = snap.progress_percentage {
        table.add_row(vec![
            Cell::new("Search space done"),
            Cell::new(format!("{:.12}%", p)),
        ]);
    }
    println!("\n{}", table);
}

pub fn print_generator_report(
    state: &GeneratorState,
    window: &[BlockRecord],
    progress: f64,
    remaining: u64,
) {
    let mut table = key_value_table("Generator");
    table.add_row(vec![Cell::new("Block size"), Cell::new(state.block_size)]);
    table.add_row(vec![Cell::new("Search space"), Cell::new(state.space_size)]);
    table.add_row(vec![
        Cell::new("Next block"),
        Cell::new(state.next_block_index),
    ]);
    table.add_row(vec![
        Cell::new("Oldest tracked block"),
        Cell::new(state.oldest_block_index),
    ]);
    table.add_row(vec![
        Cell::new("Blocks generated"),
        Cell::new(state.blocks_generated),
    ]);
    table.add_row(vec![
        Cell::new("Blocks completed"),
        Cell::new(state.blocks_completed).fg(Color::Green),
    ]);
    table.add_row(vec![Cell::new("Window size"), Cell::new(window.len())]);
    table.add_row(vec![
        Cell::new("Progress"),
        Cell::new(format!("{:.12}%", progress)).fg(Color::Cyan),
    ]);
    table.add_row(vec![Cell::new("Remaining mappings"), Cell::new(remaining)]);
    table.add_row(vec![
        Cell::new("Exhausted"),
        Cell::new(if state.exhausted { "yes" } else { "no" }),
    ]);
    println!("\n{}", table);

    if window.is_empty() {
        return;
    }

    let mut blocks = Table::new();
    blocks.load_preset(ASCII_FULL);
    blocks.set_header(vec!["Block", "State", "Owner", "Assigned", "Completed"]);
    for b in window {
        let fmt_time = |t: Option<chrono::DateTime<chrono::Utc>>| {
            t.map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_else(|| "-".to_string())
        };
        blocks.add_row(vec![
            Cell::new(b.index),
            Cell::new(format!("{:?}", b.state)),
            Cell::new(b.owner.map_or("-".to_string(), |o| o.to_string())),
            Cell::new(fmt_time(b.assigned_at)),
            Cell::new(fmt_time(b.completed_at)),
        ]);
    }
    println!("{}", blocks);
}

/// Source symbols over their targets, nine per row.
pub fn print_mapping(
    ordinal: u64,
    perm: &Permutation,
    mapping: &Mapping,
    source: &Alphabet,
    target: &Alphabet,
) {
    println!("\nMapping #{}", ordinal);

    let mut table = Table::new();
    table.load_preset(ASCII_FULL);
    for (targets, sources) in perm.chunks(9).zip(source.symbols().chunks(9)) {
        let src: Vec<Cell> = sources
            .iter()
            .map(|c| Cell::new(printable(*c)).set_alignment(CellAlignment::Center))
            .collect();
        let tgt: Vec<Cell> = targets
            .iter()
            .map(|&t| {
                let c = target.symbol(t as usize).unwrap_or('?');
                Cell::new(printable(c))
                    .fg(Color::Cyan)
                    .set_alignment(CellAlignment::Center)
            })
            .collect();
        table.add_row(src);
        table.add_row(tgt);
    }
    println!("{}", table);
    println!("{}", mapping.visualize(source, target));
}

fn printable(c: char) -> String {
    if c == ' ' {
        "␣".to_string()
    } else {
        c.to_string()
    }
}

pub fn print_results_summary(path: &str, summary: &HighScoresSummary) {
    let mut table = key_value_table("High scores");
    table.add_row(vec![Cell::new("Log file"), Cell::new(path)]);
    table.add_row(vec![
        Cell::new("Entries"),
        Cell::new(summary.total_results).fg(Color::Cyan),
    ]);
    table.add_row(vec![
        Cell::new("Highest score"),
        Cell::new(format!("{:.2}", summary.highest_score)).fg(Color::Green),
    ]);
    table.add_row(vec![
        Cell::new("Average score"),
        Cell::new(format!("{:.2}", summary.average_score)),
    ]);
    table.add_row(vec![
        Cell::new("Words validated"),
        Cell::new(summary.total_words_validated),
    ]);
    println!("\n{}", table);
}
