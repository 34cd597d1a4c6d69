//! Example of reading nested values through slices.
//!
//! cargo run --package velocypack --example nested_access

use velocypack::{Parser, TypedValue};

fn main() -> Result<(), velocypack::Error> {
    let builder = Parser::from_json(r#"{"users": [{"name": "Amy"}, {"name": "Bob"}]}"#)?;
    let root = builder.slice()?;

    // node = root["users"]
    let TypedValue::Array(users) = root.get("users")?.typed()? else {
        panic!()
    };

    // node = root["users"][1]["name"]
    let TypedValue::String(name) = users.at(1)?.get("name")?.typed()? else {
        panic!()
    };
    println!("{name}");

    // the same lookup as a path, on every user
    for user in users.iter_array()? {
        println!("{}", user.get_path(&["name"])?.get_str()?);
    }

    println!("{}", root.byte_size());
    Ok(())
}
