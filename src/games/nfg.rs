//! Reader for strategic-form game files (`.nfg`).
//!
//! Both layouts of version 1 files are accepted:
//!
//! ```text
//! NFG 1 R "Matching pennies" { "Row" "Column" } { 2 2 }
//! 1 -1 -1 1 -1 1 1 -1
//! ```
//!
//! ```text
//! NFG 1 R "Matching pennies" { "Row" "Column" }
//! { { "H" "T" } { "H" "T" } }
//! ""
//! { { "win" 1, -1 } { "lose" -1, 1 } }
//! 1 2 2 1
//! ```
//!
//! In the first, payoffs are listed player by player for every pure profile.
//! In the second, each profile names an outcome by its 1-based index, and
//! index 0 means every player gets zero. Profiles are listed with the first
//! player's strategy varying fastest. Commas are whitespace.

use num_rational::BigRational;
use num_traits::Zero;

use crate::games::table::{PlayerInfo, TableGame};
use crate::games::GameError;
use crate::nash::support::parse_rational;

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Open,
    Close,
    /// A double-quoted string, unescaped.
    Text(String),
    /// Anything else: keywords and numbers.
    Word(String),
}

fn tokenize(input: &str) -> Result<Vec<Token>, GameError> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            c if c.is_whitespace() || c == ',' => {
                chars.next();
            }
            '{' => {
                chars.next();
                tokens.push(Token::Open);
            }
            '}' => {
                chars.next();
                tokens.push(Token::Close);
            }
            '"' => {
                chars.next();
                let mut text = String::new();
                loop {
                    match chars.next() {
                        Some('"') => break,
                        Some('\\') => match chars.next() {
                            Some(escaped) => text.push(escaped),
                            None => return Err(GameError::UnexpectedEnd),
                        },
                        Some(other) => text.push(other),
                        None => return Err(GameError::UnexpectedEnd),
                    }
                }
                tokens.push(Token::Text(text));
            }
            _ => {
                let mut word = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_whitespace() || matches!(c, ',' | '{' | '}' | '"') {
                        break;
                    }
                    word.push(c);
                    chars.next();
                }
                tokens.push(Token::Word(word));
            }
        }
    }

    Ok(tokens)
}

struct Parser {
    tokens: std::vec::IntoIter<Token>,
    peeked: Option<Token>,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens: tokens.into_iter(),
            peeked: None,
        }
    }

    fn peek(&mut self) -> Option<&Token> {
        if self.peeked.is_none() {
            self.peeked = self.tokens.next();
        }
        self.peeked.as_ref()
    }

    fn next(&mut self) -> Result<Token, GameError> {
        self.peeked
            .take()
            .or_else(|| self.tokens.next())
            .ok_or(GameError::UnexpectedEnd)
    }

    fn at_close(&mut self) -> bool {
        matches!(self.peek(), Some(Token::Close))
    }

    fn open(&mut self) -> Result<(), GameError> {
        match self.next()? {
            Token::Open => Ok(()),
            other => Err(unexpected("'{'", &other)),
        }
    }

    fn close(&mut self) -> Result<(), GameError> {
        match self.next()? {
            Token::Close => Ok(()),
            other => Err(unexpected("'}'", &other)),
        }
    }

    fn text(&mut self) -> Result<String, GameError> {
        match self.next()? {
            Token::Text(text) => Ok(text),
            other => Err(unexpected("a quoted string", &other)),
        }
    }

    fn word(&mut self) -> Result<String, GameError> {
        match self.next()? {
            Token::Word(word) => Ok(word),
            other => Err(unexpected("a number or keyword", &other)),
        }
    }

    fn count(&mut self) -> Result<usize, GameError> {
        let word = self.word()?;
        word.parse().map_err(|_| GameError::InvalidNumber(word))
    }

    fn number(&mut self) -> Result<BigRational, GameError> {
        let word = self.word()?;
        parse_rational(&word).ok_or(GameError::InvalidNumber(word))
    }

    /// Texts up to the next closing brace, which is consumed.
    fn texts(&mut self) -> Result<Vec<String>, GameError> {
        let mut texts = Vec::new();
        while !self.at_close() {
            texts.push(self.text()?);
        }
        self.close()?;
        Ok(texts)
    }
}

fn unexpected(expected: &str, found: &Token) -> GameError {
    let found = match found {
        Token::Open => "'{'".to_string(),
        Token::Close => "'}'".to_string(),
        Token::Text(text) => format!("\"{}\"", text),
        Token::Word(word) => format!("'{}'", word),
    };
    GameError::SyntaxError(format!("expected {}, found {}", expected, found))
}

/// Parse an `.nfg` file.
pub fn parse_nfg(input: &str) -> Result<TableGame, GameError> {
    let mut parser = Parser::new(tokenize(input)?);

    if parser.word()? != "NFG" {
        return Err(GameError::SyntaxError("missing NFG header".to_string()));
    }
    let version = parser.word()?;
    if version != "1" {
        return Err(GameError::SyntaxError(format!(
            "unsupported file version {}",
            version
        )));
    }
    let kind = parser.word()?;
    if kind != "R" && kind != "D" {
        return Err(GameError::SyntaxError(format!(
            "unknown number kind {}",
            kind
        )));
    }
    let title = parser.text()?;

    parser.open()?;
    let names = parser.texts()?;

    parser.open()?;
    let players = if matches!(parser.peek(), Some(Token::Open)) {
        let mut strategy_lists = Vec::new();
        while !parser.at_close() {
            parser.open()?;
            strategy_lists.push(parser.texts()?);
        }
        parser.close()?;
        if strategy_lists.len() != names.len() {
            return Err(GameError::SyntaxError(format!(
                "{} players named but {} strategy lists given",
                names.len(),
                strategy_lists.len()
            )));
        }
        names
            .into_iter()
            .zip(strategy_lists)
            .map(|(name, strategies)| PlayerInfo { name, strategies })
            .collect::<Vec<_>>()
    } else {
        let mut counts = Vec::new();
        while !parser.at_close() {
            counts.push(parser.count()?);
        }
        parser.close()?;
        if counts.len() != names.len() {
            return Err(GameError::SyntaxError(format!(
                "{} players named but {} strategy counts given",
                names.len(),
                counts.len()
            )));
        }
        names
            .into_iter()
            .zip(counts)
            .map(|(name, count)| PlayerInfo::numbered(name, count))
            .collect::<Vec<_>>()
    };

    if players.is_empty() {
        return Err(GameError::NoPlayers);
    }
    let num_players = players.len();
    let num_profiles = players
        .iter()
        .try_fold(1usize, |acc, p| acc.checked_mul(p.strategies.len()))
        .ok_or(GameError::TooLarge)?;

    // Optional comment.
    if matches!(parser.peek(), Some(Token::Text(_))) {
        parser.text()?;
    }

    let mut payoffs = Vec::with_capacity(num_profiles);
    if matches!(parser.peek(), Some(Token::Open)) {
        parser.open()?;
        let mut outcomes = Vec::new();
        while !parser.at_close() {
            parser.open()?;
            parser.text()?;
            let mut outcome = Vec::with_capacity(num_players);
            for _ in 0..num_players {
                outcome.push(parser.number()?);
            }
            parser.close()?;
            outcomes.push(outcome);
        }
        parser.close()?;

        for _ in 0..num_profiles {
            let index = parser.count()?;
            let outcome = match index {
                0 => vec![BigRational::zero(); num_players],
                k => outcomes
                    .get(k - 1)
                    .cloned()
                    .ok_or(GameError::UnknownOutcome(k))?,
            };
            payoffs.push(outcome);
        }
    } else {
        for _ in 0..num_profiles {
            let mut profile = Vec::with_capacity(num_players);
            for _ in 0..num_players {
                profile.push(parser.number()?);
            }
            payoffs.push(profile);
        }
    }

    if let Some(extra) = parser.peek().cloned() {
        return Err(unexpected("end of file", &extra));
    }

    TableGame::new(title, players, payoffs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nash::game::StrategicGame;

    fn ratio(n: i64, d: i64) -> BigRational {
        BigRational::new(n.into(), d.into())
    }

    #[test]
    fn test_tokenize() {
        let tokens = tokenize(r#"NFG 1 R "a \"b\"" { 1, 2 }"#).unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Word("NFG".into()),
                Token::Word("1".into()),
                Token::Word("R".into()),
                Token::Text("a \"b\"".into()),
                Token::Open,
                Token::Word("1".into()),
                Token::Word("2".into()),
                Token::Close,
            ]
        );
        assert!(matches!(
            tokenize("\"unterminated"),
            Err(GameError::UnexpectedEnd)
        ));
    }

    #[test]
    fn test_payoff_version() {
        let game = parse_nfg(
            "NFG 1 R \"Pennies\" { \"Row\" \"Col\" } { 2 2 }\n\
             1 -1 -1 1 -1 1 1 -1\n",
        )
        .unwrap();
        assert_eq!(game.title(), "Pennies");
        assert_eq!(game.shape(), vec![2, 2]);
        assert_eq!(game.strategy_name(1, 0), "1");
        assert_eq!(game.payoff(0, &[0, 0]), ratio(1, 1));
        // Second entry is (Row 2, Col 1).
        assert_eq!(game.payoff(0, &[1, 0]), ratio(-1, 1));
        assert_eq!(game.payoff(1, &[1, 0]), ratio(1, 1));
    }

    #[test]
    fn test_outcome_version() {
        let game = parse_nfg(
            r#"NFG 1 R "Pennies" { "Row" "Col" }
            { { "H" "T" } { "H" "T" } }
            ""
            { { "win" 1, -1 } { "lose" -1, 1/2 } }
            1 2 0 1"#,
        )
        .unwrap();
        assert_eq!(game.strategy_name(0, 1), "T");
        assert_eq!(game.payoff(1, &[1, 0]), ratio(1, 2));
        assert_eq!(game.payoff(0, &[0, 1]), ratio(0, 1));
        assert_eq!(game.payoff(0, &[1, 1]), ratio(1, 1));
    }

    #[test]
    fn test_decimal_payoffs_are_exact() {
        let game = parse_nfg("NFG 1 D \"\" { \"A\" } { 2 } 0.1 2.5e-1").unwrap();
        assert_eq!(game.payoff(0, &[0]), ratio(1, 10));
        assert_eq!(game.payoff(0, &[1]), ratio(1, 4));
    }

    #[test]
    fn test_malformed_files() {
        assert!(matches!(
            parse_nfg("EFG 2 R \"\" { }"),
            Err(GameError::SyntaxError(_))
        ));
        assert!(matches!(
            parse_nfg("NFG 1 R \"\" { \"A\" \"B\" } { 2 2 } 1 2 3"),
            Err(GameError::UnexpectedEnd)
        ));
        assert!(matches!(
            parse_nfg("NFG 1 R \"\" { \"A\" } { 2 } 1 x"),
            Err(GameError::InvalidNumber(_))
        ));
        assert!(matches!(
            parse_nfg("NFG 1 R \"\" { \"A\" } { { \"a\" } } \"\" { { \"o\" 1 } } 3"),
            Err(GameError::UnknownOutcome(3))
        ));
        assert!(matches!(
            parse_nfg("NFG 1 R \"\" { \"A\" } { 1 } 1 2"),
            Err(GameError::SyntaxError(_))
        ));
    }
}
