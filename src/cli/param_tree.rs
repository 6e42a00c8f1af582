use anyhow::{Context, Result};

use mzdb::store::{MzdbStore, ParamTreeScope};

/// Print a param tree, one parameter per line
pub fn run(store: &MzdbStore, scope: ParamTreeScope) -> Result<()> {
    let tree = store
        .get_param_tree(scope)
        .with_context(|| format!("Failed to read param tree of {}", scope))?;

    println!("Param tree of {}", scope);
    println!();

    if !tree.cv_params.is_empty() {
        println!("CV Params:");
        for cv in &tree.cv_params {
            let value = cv.value.as_deref().unwrap_or("");
            match cv.unit_name {
                Some(ref unit) => println!("  {} {}: {} {}", cv.accession, cv.name, value, unit),
                None => println!("  {} {}: {}", cv.accession, cv.name, value),
            }
        }
    }

    if !tree.user_params.is_empty() {
        println!("User Params:");
        for up in &tree.user_params {
            println!(
                "  {}: {} ({})",
                up.name,
                up.value.as_deref().unwrap_or(""),
                up.param_type.as_deref().unwrap_or("untyped")
            );
        }
    }

    if !tree.user_texts.is_empty() {
        println!("User Texts:");
        for ut in &tree.user_texts {
            println!("  {}: {} bytes", ut.name, ut.text.len());
        }
    }

    if tree.is_empty() {
        println!("(empty)");
    }

    Ok(())
}
