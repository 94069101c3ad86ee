use crate::errors::NixCfgError;
use crate::store;

pub(super) fn run(answers_file: &str) -> Result<(), NixCfgError> {
    let snapshot = super::load_snapshot(answers_file, None)?;
    let description = store::describe(&snapshot)?;

    println!("{}", store::format_description(&description));

    Ok(())
}
