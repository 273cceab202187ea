use anyhow::Result;
use sharelens::{ReduceFn, ReduceJob, ShareKinds, SharePipeline, SortOrder};

const DATA_ROOT: &str = "./data";

fn main() -> Result<()> {
    let hw = std::thread::available_parallelism().map(|n| n.get()).unwrap_or(8);

    let base = SharePipeline::new()
        .data_root(DATA_ROOT)
        .parallelism(hw)
        .file_concurrency(4)
        .progress(true);

    let stats = base
        .clone()
        .progress_label("Stripping posts")
        .strip_dataset("raw-posts", "stripped")?;
    println!(
        "Stripped {} posts ({} unparseable lines skipped)",
        stats.total_posts, stats.skipped_lines
    );

    base.clone().merge_stripped("stripped", "stripped-merged.json")?;
    base.clone().remove_bots("stripped-merged.json", "bot-scores.csv", "stripped-no-bots.json")?;

    for kinds in [ShareKinds::all(), ShareKinds::without_retweets()] {
        base.clone()
            .share_kinds(kinds)
            .tfidf_similarity("stripped-no-bots.json", "measures")?;
    }

    base.clone().partisanship(
        "stripped-no-bots.json",
        "sources/valences.tab",
        "measures/partisanship.tab",
    )?;
    base.clone().ideology(
        "measures/partisanship.tab",
        "friends.json",
        "sources/ideology-senate.csv",
        "measures/ideology.tab",
    )?;
    base.clone().misinfo_exposure(
        "raw-posts",
        "sources/misinfo.tab",
        "measures/misinfo.tab",
    )?;

    base.clone().reciprocal_network("friends.json", "friends-reciprocal.json")?;
    base.clone().clustering("friends-reciprocal.json", "clustering.json")?;

    // Combine per-shard share counts into one table.
    ReduceJob::new(vec![format!("{DATA_ROOT}/counts").into()], ReduceFn::Sum)
        .skip_rows(1)
        .sort(SortOrder::Descending)
        .headers(["user id", "shares"])
        .run(format!("{DATA_ROOT}/measures/share-counts.tab").as_ref())?;

    base.anonymize("stripped-no-bots.json", "friends.json", "release")?;
    Ok(())
}
