use nom::{
    character::complete::{digit1, none_of, one_of},
    Finish,
    IResult,
    combinator::{all_consuming, map, map_res, opt, recognize, value},
    sequence::{delimited, pair, preceded, separated_pair, terminated, tuple},
    branch::alt,
    bytes::complete::{escaped_transform, tag, take_while, take_while1},
    multi::{many0, separated_list0},
};
use amf3::Value;
use anyhow::{anyhow, Result};

pub enum Keyword {
    Null,
    True,
    False,
}

const WHITESPACE: &str = " \t\r\n";
const PROTECTED_CHARS: &str = "\n\\$ ,:\"'()[]{}#";

fn white(i: &str) -> IResult<&str, &str> {
    take_while(move |c| WHITESPACE.contains(c))(i)
}

fn separator(i: &str) -> IResult<&str, &str> {
    delimited(white, tag(","), white)(i)
}

fn keyword(i: &str) -> IResult<&str, Keyword> {
    alt((
            map(tag("null"), |_| Keyword::Null),
            map(tag("true"), |_| Keyword::True),
            map(tag("false"),|_| Keyword::False)
    ))(i)
}

fn float(i: &str) -> IResult<&str, &str> {
    alt((
        tag("NaN"),
        recognize(pair(opt(tag("-")), tag("inf"))),
        recognize(tuple((
            opt(tag("-")),
            digit1,
            opt(pair(tag("."), digit1)),
            opt(tuple((one_of("eE"), opt(one_of("+-")), digit1))),
        ))),
    ))(i)
}

fn double(i: &str) -> IResult<&str, f64> {
    map_res(preceded(tag("$"), float), |n: &str| n.parse())(i)
}

fn integer(i: &str) -> IResult<&str, i64> {
    map_res(recognize(pair(opt(tag("-")), digit1)), |n: &str| n.parse())(i)
}

fn string(i: &str) -> IResult<&str, String> {
    delimited(
            tag("\""),
            map(opt(escaped_transform(
                none_of("\\\""),
                '\\',
                alt((
                        value("\\", tag("\\")),
                        value("\"", tag("\"")),
                        value("\n", tag("n")),
                )))), |c| c.unwrap_or_default()),
            tag("\"")
    )(i)
}

fn bare_key(i: &str) -> IResult<&str, String> {
    map(take_while1(|c: char| !PROTECTED_CHARS.contains(c) && !WHITESPACE.contains(c)), String::from)(i)
}

fn key(i: &str) -> IResult<&str, String> {
    alt((string, bare_key))(i)
}

fn array(i: &str) -> IResult<&str, Value> {
    map(
        delimited(
            pair(tag("["), white),
            terminated(separated_list0(separator, amf_value), opt(separator)),
            pair(white, tag("]")),
        ),
        Value::array,
    )(i)
}

fn entry(i: &str) -> IResult<&str, (String, Value)> {
    separated_pair(key, tuple((white, tag(":"), white)), amf_value)(i)
}

fn object(i: &str) -> IResult<&str, Value> {
    map(
        delimited(
            pair(tag("("), white),
            terminated(separated_list0(separator, entry), opt(separator)),
            pair(white, tag(")")),
        ),
        Value::object,
    )(i)
}

fn amf_value(i: &str) -> IResult<&str, Value> {
    alt((
        map(string, Value::String),
        array,
        object,
        map(double, Value::Double),
        map(integer, Value::from),
        map(keyword, |k| match k {
            Keyword::Null => Value::Null,
            Keyword::True => Value::Bool(true),
            Keyword::False => Value::Bool(false)
    })))(i)
}

/// Parses any number of whitespace separated values in the notation `Value` displays itself in.
pub fn parse(i: &str) -> Result<Vec<Value>> {
    Ok(all_consuming(preceded(white, many0(terminated(amf_value, white))))(i).finish().map_err(|e| anyhow!("{}", e))?.1)
}
