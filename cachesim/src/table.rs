use cachelib::simulator::RunSummary;

/// Renders one row per line and one column per access
///
/// A column shows `H` in the line that hit, or `block:label (first - last)` in the line the block
/// was loaded into. The second column is the initial contents in the same form
pub fn render(summary: &RunSummary, show_hits: bool) -> String {
    let snapshot = &summary.initial_snapshot;
    let line_count = snapshot.len();
    let accesses: Vec<_> = summary.results.iter().filter(|r| show_hits || !r.hit).collect();

    let mut header = vec!["Line".to_string(), "Initial".to_string()];
    header.extend(accesses.iter().map(|r| {
        if r.hit {
            r.address.to_string()
        } else {
            format!("Miss: {}", r.address)
        }
    }));
    let mut rows = vec![header];
    for (line, words) in snapshot.lines().iter().enumerate() {
        let (first, last) = snapshot.bounds(line);
        let block = first / words.len() as u64;
        let mut row = vec![line.to_string(), format!("{block}:{} ({first} - {last})", block / line_count as u64)];
        row.extend(accesses.iter().map(|r| match (r.line == line, r.hit) {
            (false, _) => String::new(),
            (true, true) => "H".to_string(),
            (true, false) => format!(
                "{}:{} ({} - {})",
                r.block, r.label, r.block_addresses.range_min, r.block_addresses.range_max
            ),
        }));
        rows.push(row);
    }

    let widths: Vec<usize> = (0..rows[0].len())
        .map(|column| rows.iter().map(|row| row[column].len()).max().unwrap_or(0))
        .collect();
    let mut out: Vec<String> = rows
        .iter()
        .map(|row| {
            row.iter()
                .zip(&widths)
                .map(|(cell, &width)| format!("{cell:<width$}"))
                .collect::<Vec<_>>()
                .join(" | ")
                .trim_end()
                .to_string()
        })
        .collect();
    out.push(format!("Misses: {} of {}", summary.miss_count, summary.results.len()));
    out.join("\n") + "\n"
}
