use crate::app::report;
use crate::core::catalog::Catalog;
use crate::core::engine::BundleEngine;
use crate::core::selector;
use crate::domain::model::Query;
use crate::domain::ports::{BundleGenerator, DatasetSource};
use crate::utils::error::{BundleError, Result};
use std::io::{BufRead, Write};

const HELP: &str = "\
Commands:
  product <text>    search by product name
  category <text>   search by category
  generate          ask for bundles for the last search
  reload            read the order history again
  help              show this message
  quit              leave";

#[derive(Debug, Clone, Copy, Default)]
pub struct SessionOptions {
    pub json: bool,
    pub dry_run: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Input {
    Search(Query),
    Generate,
    Reload,
    Help,
    Quit,
    Empty,
    Unknown(String),
}

fn parse_input(line: &str) -> Input {
    let line = line.trim();
    let (command, rest) = match line.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (line, ""),
    };

    match command.to_lowercase().as_str() {
        "" => Input::Empty,
        "product" | "p" if !rest.is_empty() => Input::Search(Query::ByProduct(rest.to_string())),
        "category" | "c" if !rest.is_empty() => Input::Search(Query::ByCategory(rest.to_string())),
        "generate" | "g" => Input::Generate,
        "reload" => Input::Reload,
        "help" | "?" => Input::Help,
        "quit" | "exit" | "q" => Input::Quit,
        _ => Input::Unknown(line.to_string()),
    }
}

/// 互動模式：先查詢、確認候選商品，再觸發生成
pub struct Session<S: DatasetSource, G: BundleGenerator> {
    catalog: Catalog<S>,
    engine: BundleEngine<G>,
    options: SessionOptions,
    pending: Option<Query>,
}

impl<S: DatasetSource, G: BundleGenerator> Session<S, G> {
    pub fn new(catalog: Catalog<S>, engine: BundleEngine<G>, options: SessionOptions) -> Self {
        Self {
            catalog,
            engine,
            options,
            pending: None,
        }
    }

    /// 回傳實際送出的生成請求次數；資料集為空時立即停止
    pub async fn run<R: BufRead, W: Write>(&mut self, input: R, mut out: W) -> Result<usize> {
        if self.catalog.get().is_empty() {
            writeln!(out, "{}", report::render_error(&no_data()))?;
            return Ok(0);
        }

        writeln!(out, "📦 BundleUp - every purchase is a chance to bundle up!")?;
        writeln!(out, "{}", HELP)?;

        let mut requests = 0;
        for line in input.lines() {
            match parse_input(&line?) {
                Input::Empty => {}
                Input::Quit => break,
                Input::Help => writeln!(out, "{}", HELP)?,
                Input::Unknown(text) => writeln!(out, "❓ Unknown command: {} (type 'help')", text)?,
                Input::Search(query) => self.search(query, &mut out)?,
                Input::Reload => {
                    self.pending = None;
                    let dataset = self.catalog.reload();
                    writeln!(out, "🔄 Loaded {} records", dataset.len())?;
                    if dataset.is_empty() {
                        writeln!(out, "{}", report::render_error(&no_data()))?;
                        break;
                    }
                }
                Input::Generate => {
                    if self.generate(&mut out).await? {
                        requests += 1;
                    }
                }
            }
        }

        Ok(requests)
    }

    fn search<W: Write>(&mut self, query: Query, out: &mut W) -> Result<()> {
        let dataset = self.catalog.get();
        match selector::select_candidates(&dataset, &query, self.engine.policy()) {
            Ok(candidates) => {
                writeln!(out, "{}", report::render_selection(&query, &candidates))?;
                self.pending = Some(query);
            }
            Err(e) => {
                writeln!(out, "{}", report::render_error(&e))?;
                self.pending = None;
            }
        }
        Ok(())
    }

    async fn generate<W: Write>(&mut self, out: &mut W) -> Result<bool> {
        let Some(query) = self.pending.clone() else {
            writeln!(out, "⚠️ Search for a product or category first.")?;
            return Ok(false);
        };
        let dataset = self.catalog.get();

        if self.options.dry_run {
            match self.engine.prompt_for(&dataset, &query) {
                Ok(prompt) => writeln!(out, "{}", prompt)?,
                Err(e) => writeln!(out, "{}", report::render_error(&e))?,
            }
            return Ok(false);
        }

        writeln!(out, "🧠 Thinking...")?;
        match self.engine.run(&dataset, &query).await {
            Ok(outcome) => {
                let rendered = if self.options.json {
                    report::render_json(&outcome)?
                } else {
                    report::render_text(&outcome)
                };
                writeln!(out, "{}", rendered)?;
                Ok(true)
            }
            Err(e) if e.is_recoverable() => {
                writeln!(out, "{}", report::render_error(&e))?;
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }
}

fn no_data() -> BundleError {
    BundleError::DataLoadError {
        message: "the order history could not be loaded".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_input() {
        assert_eq!(
            parse_input("product  Desk Lamp "),
            Input::Search(Query::ByProduct("Desk Lamp".to_string()))
        );
        assert_eq!(
            parse_input("C kitchen"),
            Input::Search(Query::ByCategory("kitchen".to_string()))
        );
        assert_eq!(parse_input("generate"), Input::Generate);
        assert_eq!(parse_input("   "), Input::Empty);
        assert_eq!(parse_input("exit"), Input::Quit);
        assert_eq!(parse_input("product"), Input::Unknown("product".to_string()));
        assert_eq!(parse_input("dance"), Input::Unknown("dance".to_string()));
    }
}
