//! Tests for the character-level tokenizer

use pretty_assertions::assert_eq;
use sqlscope::{tokenize, Token, TokenKind, Tokenizer, TokenizerOptions};

fn texts(tokens: &[Token]) -> Vec<&str> {
    tokens.iter().map(|t| t.text.as_str()).collect()
}

fn kinds(tokens: &[Token]) -> Vec<TokenKind> {
    tokens.iter().map(|t| t.kind).collect()
}

// ============================================================================
// Basic classification
// ============================================================================

#[test]
fn test_words_numbers_operators_punctuation() {
    let tokens = tokenize("select id + 42 from t;");
    assert_eq!(texts(&tokens), vec!["select", "id", "+", "42", "from", "t", ";"]);
    assert_eq!(
        kinds(&tokens),
        vec![
            TokenKind::Word,
            TokenKind::Word,
            TokenKind::Operator,
            TokenKind::Number,
            TokenKind::Word,
            TokenKind::Word,
            TokenKind::Punctuation,
        ]
    );
}

#[test]
fn test_keywords_are_not_distinguished_from_identifiers() {
    let tokens = tokenize("SELECT select Select");
    assert!(tokens.iter().all(|t| t.kind == TokenKind::Word));
}

#[test]
fn test_number_forms() {
    for text in ["0", "42", "1e10", "2E5", "0b1010", "0x1A3F"] {
        let tokens = tokenize(text);
        assert_eq!(tokens.len(), 1, "{text}");
        assert_eq!(tokens[0].kind, TokenKind::Number, "{text}");
    }
}

#[test]
fn test_decimal_point_splits_into_three_tokens() {
    // The dot belongs to the operator alphabet, so a decimal literal
    // arrives as number, dot, number; downstream consumers reassemble.
    let tokens = tokenize("1.5");
    assert_eq!(texts(&tokens), vec!["1", ".", "5"]);
    assert_eq!(
        kinds(&tokens),
        vec![TokenKind::Number, TokenKind::Operator, TokenKind::Number]
    );
}

#[test]
fn test_operator_runs_are_single_tokens() {
    let tokens = tokenize("a <= b <> c || d");
    assert_eq!(texts(&tokens), vec!["a", "<=", "b", "<>", "c", "||", "d"]);
}

#[test]
fn test_every_punctuation_character_is_its_own_token() {
    let tokens = tokenize("()[]{},;");
    assert_eq!(tokens.len(), 8);
    assert!(tokens.iter().all(|t| t.kind == TokenKind::Punctuation));
}

#[test]
fn test_dotted_name_keeps_dot_as_operator() {
    let tokens = tokenize("schema.table");
    assert_eq!(texts(&tokens), vec!["schema", ".", "table"]);
    assert_eq!(tokens[1].kind, TokenKind::Operator);
}

// ============================================================================
// Strings and quoted identifiers
// ============================================================================

#[test]
fn test_single_quoted_string() {
    let tokens = tokenize("'hello world'");
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].kind, TokenKind::String);
    assert_eq!(tokens[0].text, "'hello world'");
}

#[test]
fn test_backtick_string() {
    let tokens = tokenize("`quoted`");
    assert_eq!(tokens[0].kind, TokenKind::String);
}

#[test]
fn test_double_quoted_content_is_an_identifier() {
    let tokens = tokenize("\"Mixed Case\"");
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].kind, TokenKind::Word);
    assert_eq!(tokens[0].text, "\"Mixed Case\"");
}

#[test]
fn test_doubled_delimiter_is_an_escape_not_a_terminator() {
    let tokens = tokenize("'it''s fine'");
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].text, "'it''s fine'");

    let tokens = tokenize("\"a\"\"b\"");
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].text, "\"a\"\"b\"");
}

#[test]
fn test_comment_markers_inside_strings_are_literal() {
    let tokens = tokenize("'a--b' 'c/*d*/'");
    assert_eq!(tokens.len(), 2);
    assert!(tokens.iter().all(|t| t.kind == TokenKind::String));
}

#[test]
fn test_unterminated_string_flushes_at_end_of_input() {
    let tokens = tokenize("select 'oops");
    assert_eq!(tokens.len(), 2);
    assert_eq!(tokens[1].kind, TokenKind::String);
    assert_eq!(tokens[1].text, "'oops");
}

// ============================================================================
// Comments
// ============================================================================

#[test]
fn test_line_comment_runs_to_newline() {
    let tokens = tokenize("a -- rest of line\nb");
    assert_eq!(texts(&tokens), vec!["a", "-- rest of line\n", "b"]);
    assert_eq!(tokens[1].kind, TokenKind::Comment);
}

#[test]
fn test_block_comment_is_one_token() {
    let tokens = tokenize("a /* multi\nline */ b");
    assert_eq!(tokens.len(), 3);
    assert_eq!(tokens[1].kind, TokenKind::Comment);
    assert_eq!(tokens[1].text, "/* multi\nline */");
}

#[test]
fn test_unterminated_comment_flushes_as_comment() {
    let tokens = tokenize("a /* never closed");
    assert_eq!(tokens.len(), 2);
    assert_eq!(tokens[1].kind, TokenKind::Comment);
}

#[test]
fn test_double_minus_inside_expression_starts_a_comment() {
    let tokens = tokenize("a--b");
    assert_eq!(tokens.len(), 2);
    assert_eq!(tokens[1].kind, TokenKind::Comment);
}

// ============================================================================
// Positions
// ============================================================================

#[test]
fn test_offsets_are_exact_and_end_exclusive() {
    let tokens = tokenize("select x");
    let select = &tokens[0].position;
    assert_eq!((select.start_offset, select.end_offset), (0, 6));
    let x = &tokens[1].position;
    assert_eq!((x.start_offset, x.end_offset), (7, 8));
    assert!(x.contains(7));
    assert!(!x.contains(8));
}

#[test]
fn test_newline_advances_line_and_resets_column() {
    let tokens = tokenize("one\n  two");
    let one = &tokens[0].position;
    assert_eq!((one.start_line, one.start_column), (1, 1));
    assert_eq!((one.end_line, one.end_column), (1, 4));
    let two = &tokens[1].position;
    assert_eq!((two.start_line, two.start_column), (2, 3));
    assert_eq!((two.start_offset, two.end_offset), (6, 9));
}

#[test]
fn test_multiline_token_spans_lines() {
    let tokens = tokenize("/* a\nb */");
    let comment = &tokens[0].position;
    assert_eq!(comment.start_line, 1);
    assert_eq!(comment.end_line, 2);
}

#[test]
fn test_token_concatenation_reconstructs_source_modulo_whitespace() {
    let sql = "select a.x, 'lit''eral' from s.t -- c\nwhere a.x <> 0x1F /* b */";
    let tokens = tokenize(sql);
    let stripped: String = sql.chars().filter(|c| !c.is_whitespace()).collect();
    let joined: String = tokens
        .iter()
        .flat_map(|t| t.text.chars())
        .filter(|c| !c.is_whitespace())
        .collect();
    assert_eq!(joined, stripped);
}

// ============================================================================
// Configuration
// ============================================================================

#[test]
fn test_extra_identifier_chars_extend_the_alphabet() {
    let tokenizer = Tokenizer::new(TokenizerOptions {
        extra_identifier_chars: vec!['$', '#'],
    });
    let tokens = tokenizer.tokenize("v$session #tmp");
    assert_eq!(tokens.len(), 2);
    assert_eq!(tokens[0].text, "v$session");
    assert_eq!(tokens[0].kind, TokenKind::Word);
    assert_eq!(tokens[1].text, "#tmp");
}

#[test]
fn test_extra_identifier_chars_are_removed_from_operators() {
    // By default `@` is an operator character and splits the name.
    let default_tokens = tokenize("a@b");
    assert_eq!(default_tokens.len(), 3);

    let tokenizer = Tokenizer::new(TokenizerOptions {
        extra_identifier_chars: vec!['@'],
    });
    let tokens = tokenizer.tokenize("a@b");
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].kind, TokenKind::Word);
}

#[test]
fn test_empty_and_whitespace_input() {
    assert!(tokenize("").is_empty());
    assert!(tokenize("   \n\t  ").is_empty());
}
