use daf_core::{BookIndex, QueryError, QueryGuess, QueryResult};
use serde::Serialize;

use crate::cli::{GlobalFlags, ParseArgs};
use crate::output::output;

#[derive(Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
enum ParseOutcome {
    Parsed {
        #[serde(flatten)]
        query: QueryResult,
        path: String,
    },
    Guesses {
        guesses: Vec<QueryGuess>,
    },
}

fn resolve(books: &BookIndex, text: &str) -> Result<ParseOutcome, QueryError> {
    let query = match books.parse(text) {
        Ok(query) => query,
        Err(QueryError::UnknownBookName(name)) => {
            let guesses = books.guesses(text);
            if guesses.is_empty() {
                return Err(QueryError::UnknownBookName(name));
            }
            return Ok(ParseOutcome::Guesses { guesses });
        }
        Err(e) => return Err(e),
    };
    books.validate_pages(&query)?;
    let path = query.to_url_pathname();
    Ok(ParseOutcome::Parsed { query, path })
}

/// Handle `daf parse`.
pub fn handle(args: &ParseArgs, flags: &GlobalFlags) -> anyhow::Result<()> {
    let books = BookIndex::builtin()?;
    output(&resolve(&books, &args.query)?, flags.format)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn books() -> BookIndex {
        BookIndex::builtin().unwrap()
    }

    #[test]
    fn parsed_queries_carry_their_path() {
        let outcome = resolve(&books(), "Brachot 20").unwrap();
        assert_eq!(
            serde_json::to_value(outcome).unwrap(),
            json!({"book": "Berakhot", "start": "20a", "end": "20b", "path": "/Berakhot/20a-20b"})
        );
    }

    #[test]
    fn unknown_titles_fall_back_to_guesses() {
        let ParseOutcome::Guesses { guesses } = resolve(&books(), "Brakhott 2a").unwrap() else {
            panic!("expected guesses");
        };
        assert_eq!(guesses[0].url, "/Berakhot/2a");
        assert!(matches!(resolve(&books(), "Qqqqqqqqqqqq 2a"), Err(QueryError::UnknownBookName(_))));
    }

    #[test]
    fn bare_titles_are_rejected() {
        assert!(matches!(resolve(&books(), "Brachot"), Err(QueryError::InvalidQuery(_))));
    }
}
