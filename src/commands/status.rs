use anyhow::Result;
use tracing::{info, warn};

use crate::cli::{StatusArgs, raw_text_path_for};
use crate::commands::convert::{MASTER_INDEX_FILE, chapter_file_name};
use crate::commands::inventory::inventory_path_for;
use crate::model::{MasterIndex, SourceInventory, SourceText};
use crate::util::read_json;

pub fn run(args: StatusArgs) -> Result<()> {
    let inventory_path = inventory_path_for(&args.work_root);
    let raw_text_path = raw_text_path_for(&args.work_root, None);
    let master_index_path = args.output_dir.join(MASTER_INDEX_FILE);

    info!(input_dir = %args.input_dir.display(), "status requested");

    if inventory_path.exists() {
        let inventory: SourceInventory = read_json(&inventory_path)?;
        info!(
            generated_at = %inventory.generated_at,
            documents = inventory.document_count,
            "loaded source inventory"
        );
    } else {
        warn!(path = %inventory_path.display(), "source inventory missing; run `mcqbank inventory` or `mcqbank extract`");
    }

    if raw_text_path.exists() {
        let documents: Vec<SourceText> = read_json(&raw_text_path)?;
        let lines = documents
            .iter()
            .map(|document| document.text.lines().count())
            .sum::<usize>();
        info!(documents = documents.len(), lines, "loaded raw text dump");
    } else {
        warn!(path = %raw_text_path.display(), "raw text dump missing; run `mcqbank extract`");
    }

    if master_index_path.exists() {
        let index: MasterIndex = read_json(&master_index_path)?;
        info!(
            generated_at = %index.generated_at,
            chapters = index.total_chapters,
            questions = index.total_questions,
            "loaded master index"
        );

        let missing = index
            .chapters
            .iter()
            .filter(|entry| !args.output_dir.join(chapter_file_name(entry.id)).exists())
            .map(|entry| entry.id)
            .collect::<Vec<usize>>();
        if missing.is_empty() {
            info!("all indexed chapter files present");
        } else {
            warn!(missing = ?missing, "indexed chapter files missing; rerun `mcqbank convert`");
        }
    } else {
        warn!(path = %master_index_path.display(), "master index missing; run `mcqbank convert`");
    }

    Ok(())
}
