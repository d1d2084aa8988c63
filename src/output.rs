use crate::error::Result;
use crate::reports::{card_rows, summary_rows};
use crate::types::{KpiCard, RegionTable};
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use tabled::{settings::Style, Table, Tabled};

/// Presentation seam: the report builders produce display-ready values and a
/// renderer decides where they go.
pub trait Renderer {
    fn render_cards(&mut self, cards: &[KpiCard]) -> Result<()>;
    fn render_table(&mut self, table: &RegionTable) -> Result<()>;
}

/// Renders cards and tables as Markdown, optionally truncating the table.
pub struct MarkdownRenderer<W: Write> {
    out: W,
    max_rows: Option<usize>,
}

impl<W: Write> MarkdownRenderer<W> {
    pub fn new(out: W) -> Self {
        MarkdownRenderer {
            out,
            max_rows: None,
        }
    }

    pub fn with_max_rows(mut self, max_rows: usize) -> Self {
        self.max_rows = Some(max_rows);
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Renderer for MarkdownRenderer<W> {
    fn render_cards(&mut self, cards: &[KpiCard]) -> Result<()> {
        writeln!(self.out, "Avance Nacional\n")?;
        write_table(&mut self.out, &card_rows(cards))
    }

    fn render_table(&mut self, table: &RegionTable) -> Result<()> {
        writeln!(self.out, "Resumen Estatal")?;
        writeln!(
            self.out,
            "(Ordenado por % de {})\n",
            table.ranked_by.key()
        )?;
        let mut rows = summary_rows(table);
        if let Some(max) = self.max_rows {
            // Keep the national total visible under truncation.
            if rows.len() > max + 1 {
                let total = rows.pop();
                rows.truncate(max);
                rows.extend(total);
            }
        }
        write_table(&mut self.out, &rows)
    }
}

fn write_table<T, W>(out: &mut W, rows: &[T]) -> Result<()>
where
    T: Tabled + Clone,
    W: Write,
{
    if rows.is_empty() {
        writeln!(out, "(sin filas)\n")?;
        return Ok(());
    }
    let table_str = Table::new(rows.to_vec()).with(Style::markdown()).to_string();
    writeln!(out, "{}\n", table_str)?;
    Ok(())
}

pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    Ok(())
}
