use anyhow::Result;
use nest_core::configs::module::descriptor_schema;

pub fn execute() -> Result<()> {
    println!("{}", descriptor_schema()?);
    Ok(())
}
