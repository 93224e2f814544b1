//! Structural parsing of resolved section text into presentation blocks.
//!
//! Runs after `render::resolve`, so substituted variable and reference text
//! participates in structure like any other text. Supported syntax mirrors
//! what authors actually write in section bodies: `##`/`###` headings,
//! `-`/`*` bullets, `1.` ordered items, `>` callouts, pipe tables with an
//! optional `---` separator row, and fenced ```mermaid diagrams. Everything
//! else is a paragraph. `**bold**` markers are stripped for flat text output.

use regex::Regex;

/// Column alignment taken from a table's separator row (`:---`, `:---:`, `---:`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableBlock {
    pub header: Option<Vec<String>>,
    pub alignments: Vec<Align>,
    pub rows: Vec<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Heading { level: u8, text: String },
    Paragraph(String),
    Bullet(String),
    Numbered { number: u32, text: String },
    Quote(String),
    Table(TableBlock),
    /// Mermaid source, kept verbatim for a diagram-capable renderer;
    /// the PDF exporter prints it as a monospace block.
    Diagram(String),
}

/// Strip `**bold**` emphasis markers, keeping the inner text.
fn strip_bold(text: &str) -> String {
    let re = Regex::new(r"\*\*(.*?)\*\*").unwrap();
    re.replace_all(text, "$1").into_owned()
}

fn split_table_row(line: &str) -> Vec<String> {
    line.trim()
        .trim_start_matches('|')
        .trim_end_matches('|')
        .split('|')
        .map(|cell| strip_bold(cell.trim()))
        .collect()
}

fn parse_alignments(separator: &str) -> Vec<Align> {
    separator
        .trim()
        .trim_start_matches('|')
        .trim_end_matches('|')
        .split('|')
        .map(|col| {
            let c = col.trim();
            if c.starts_with(':') && c.ends_with(':') {
                Align::Center
            } else if c.ends_with(':') {
                Align::Right
            } else {
                Align::Left
            }
        })
        .collect()
}

fn flush_table(buffer: &mut Vec<String>, blocks: &mut Vec<Block>) {
    if buffer.is_empty() {
        return;
    }
    let has_header = buffer.len() >= 2 && buffer[1].contains("---");
    let (header, alignments, body) = if has_header {
        (
            Some(split_table_row(&buffer[0])),
            parse_alignments(&buffer[1]),
            &buffer[2..],
        )
    } else {
        (None, Vec::new(), &buffer[..])
    };
    blocks.push(Block::Table(TableBlock {
        header,
        alignments,
        rows: body.iter().map(|row| split_table_row(row)).collect(),
    }));
    buffer.clear();
}

fn parse_text_lines(text: &str, blocks: &mut Vec<Block>) {
    let numbered = Regex::new(r"^(\d+)\.\s+(.*)").unwrap();
    let mut table_buffer: Vec<String> = Vec::new();

    for line in text.lines() {
        let trimmed = line.trim();

        if trimmed.starts_with('|') {
            table_buffer.push(trimmed.to_string());
            continue;
        }
        flush_table(&mut table_buffer, blocks);

        if trimmed.is_empty() {
            continue;
        }

        if let Some(rest) = trimmed.strip_prefix("### ") {
            blocks.push(Block::Heading {
                level: 3,
                text: strip_bold(rest),
            });
        } else if let Some(rest) = trimmed.strip_prefix("## ") {
            blocks.push(Block::Heading {
                level: 2,
                text: strip_bold(rest),
            });
        } else if let Some(rest) = trimmed.strip_prefix("- ").or(trimmed.strip_prefix("* ")) {
            blocks.push(Block::Bullet(strip_bold(rest)));
        } else if let Some(rest) = trimmed.strip_prefix("> ") {
            blocks.push(Block::Quote(strip_bold(rest)));
        } else if let Some(caps) = numbered.captures(trimmed) {
            blocks.push(Block::Numbered {
                number: caps[1].parse().unwrap_or(0),
                text: strip_bold(&caps[2]),
            });
        } else {
            blocks.push(Block::Paragraph(strip_bold(trimmed)));
        }
    }
    flush_table(&mut table_buffer, blocks);
}

/// Parse resolved section text into an ordered block sequence.
pub fn parse_blocks(text: &str) -> Vec<Block> {
    let mermaid = Regex::new(r"```mermaid[ \t]*\n((?s).*?)\n[ \t]*```").unwrap();
    let mut blocks = Vec::new();
    let mut last = 0;

    for caps in mermaid.captures_iter(text) {
        let whole = caps.get(0).unwrap();
        let before = &text[last..whole.start()];
        if !before.trim().is_empty() {
            parse_text_lines(before, &mut blocks);
        }
        blocks.push(Block::Diagram(caps[1].trim().to_string()));
        last = whole.end();
    }
    let after = &text[last..];
    if !after.trim().is_empty() {
        parse_text_lines(after, &mut blocks);
    }

    blocks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paragraphs_and_headings() {
        let blocks = parse_blocks("## Scope\nAll production sites.\n### Detail\nMore.");
        assert_eq!(
            blocks,
            vec![
                Block::Heading {
                    level: 2,
                    text: "Scope".into()
                },
                Block::Paragraph("All production sites.".into()),
                Block::Heading {
                    level: 3,
                    text: "Detail".into()
                },
                Block::Paragraph("More.".into()),
            ]
        );
    }

    #[test]
    fn lists_and_quotes() {
        let blocks = parse_blocks("- first\n* second\n1. step one\n> Note: wear gloves");
        assert_eq!(
            blocks,
            vec![
                Block::Bullet("first".into()),
                Block::Bullet("second".into()),
                Block::Numbered {
                    number: 1,
                    text: "step one".into()
                },
                Block::Quote("Note: wear gloves".into()),
            ]
        );
    }

    #[test]
    fn bold_markers_are_stripped() {
        let blocks = parse_blocks("The **quality manager** signs within **5 days**.");
        assert_eq!(
            blocks,
            vec![Block::Paragraph(
                "The quality manager signs within 5 days.".into()
            )]
        );
    }

    #[test]
    fn table_with_header_and_alignments() {
        let text = "| Item | Result | Notes |\n| :--- | :---: | ---: |\n| Check A | OK | — |\n| Check B | FAIL | recheck |";
        let blocks = parse_blocks(text);
        assert_eq!(blocks.len(), 1);
        match &blocks[0] {
            Block::Table(table) => {
                assert_eq!(
                    table.header.as_deref(),
                    Some(&["Item".to_string(), "Result".into(), "Notes".into()][..])
                );
                assert_eq!(table.alignments, vec![Align::Left, Align::Center, Align::Right]);
                assert_eq!(table.rows.len(), 2);
                assert_eq!(table.rows[1][1], "FAIL");
            }
            other => panic!("expected table, got {other:?}"),
        }
    }

    #[test]
    fn headerless_table_keeps_all_rows_as_body() {
        let blocks = parse_blocks("| a | b |\n| c | d |");
        match &blocks[0] {
            Block::Table(table) => {
                assert!(table.header.is_none());
                assert_eq!(table.rows.len(), 2);
            }
            other => panic!("expected table, got {other:?}"),
        }
    }

    #[test]
    fn mermaid_fence_becomes_diagram_block() {
        let text = "Process flow:\n```mermaid\ngraph TD\n  A((Start)) --> B[Step]\n```\nEnd of section.";
        let blocks = parse_blocks(text);
        assert_eq!(blocks[0], Block::Paragraph("Process flow:".into()));
        assert_eq!(
            blocks[1],
            Block::Diagram("graph TD\n  A((Start)) --> B[Step]".into())
        );
        assert_eq!(blocks[2], Block::Paragraph("End of section.".into()));
    }

    #[test]
    fn table_adjacent_to_paragraph_flushes_cleanly() {
        let blocks = parse_blocks("intro\n| x | y |\nafter");
        assert_eq!(blocks.len(), 3);
        assert!(matches!(blocks[1], Block::Table(_)));
    }

    #[test]
    fn empty_text_yields_no_blocks() {
        assert!(parse_blocks("").is_empty());
        assert!(parse_blocks("   \n  ").is_empty());
    }
}
