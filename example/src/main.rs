use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use anyhow::Result;

#[derive(Serialize, Deserialize, Debug, PartialEq, Default)]
#[allow(non_snake_case)]
struct Abc {
    Uname: String,
    Uid: i32,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
#[allow(non_snake_case)]
struct Test {
    #[serde(rename = "str")]
    Text: String,
    Uint: usize,
    Uint8: u8,
    Uint16: u16,
    Uint32: u32,
    Uint64: u64,
    Int: isize,
    Int8: i8,
    Int16: i16,
    Int32: i32,
    Int64: i64,
    Float32: f32,
    Float64: f64,
    Map: BTreeMap<String, Abc>,
    Slice: Vec<Abc>,
    Struct: Abc,
    Null: Option<Abc>,
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

fn main() -> Result<()> {
    let test = Test {
        Text: "测试".to_string(),
        Uint: 0,
        Uint8: 0,
        Uint16: 0,
        Uint32: 0,
        Uint64: 0,
        Int: 1,
        Int8: 32,
        Int16: 2,
        Int32: 3,
        Int64: 4,
        Float32: 1.23,
        Float64: 0.000001,
        Map: [("hello".to_string(), Abc::default())].into_iter().collect(),
        Slice: vec![Abc::default()],
        Struct: Abc { Uname: "hello".to_string(), Uid: 0 },
        Null: None,
    };

    let bytes = amf3_serde::to_bytes(&test)?;
    println!("{}", hex(&bytes));

    let decoded: Test = amf3_serde::from_slice(&bytes)?;
    assert_eq!(test, decoded);
    println!("{:?}", decoded);

    // the same bytes read without a destination type
    let (value, _) = amf3::Decoder::decode(&bytes[..])?;
    println!("{}", value);

    let json = serde_json::to_string(&value)?;
    println!("{}", json);
    println!("amf3: {} bytes, json: {} bytes", bytes.len(), json.len());
    Ok(())
}
