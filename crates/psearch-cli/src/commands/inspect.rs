use crate::cli::InspectArgs;
use crate::error::{CliError, Result};
use psearch::core::io::store::{FileStore, StoredDatabase};
use tracing::info;

pub fn run(args: InspectArgs) -> Result<()> {
    info!("Reading database {:?}", &args.db);
    let db = FileStore::read(&args.db)?;
    print!("{}", render_summary(&db, args.id.as_deref())?);
    Ok(())
}

fn render_summary(db: &StoredDatabase, only_id: Option<&str>) -> Result<String> {
    let ids: Vec<&str> = match only_id {
        Some(id) if db.molecules.contains_key(id) => vec![id],
        Some(id) => {
            return Err(CliError::Argument(format!(
                "Molecule '{}' is not in the database.",
                id
            )));
        }
        None => db.ids().collect(),
    };

    let bin_step = db
        .bin_step
        .map_or_else(|| "unset".to_string(), |b| b.to_string());
    let mut out = format!("bin step:  {}\nmolecules: {}\n", bin_step, db.len());
    for id in ids {
        out.push_str(&molecule_line(db, id));
    }
    Ok(out)
}

fn molecule_line(db: &StoredDatabase, id: &str) -> String {
    let variants = &db.molecules[id];
    let per_variant: Vec<String> = variants
        .iter()
        .map(|(index, mol)| format!("{}:{}", index, mol.num_conformers()))
        .collect();
    format!(
        "{}\tstereoisomers={}\tconformers={}\t[{}]\n",
        id,
        variants.len(),
        db.conformer_count(id).unwrap_or(0),
        per_variant.join(", ")
    )
}
