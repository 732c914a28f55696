use crate::{DocId, RankedDoc};
use std::cmp::Ordering;
use std::collections::HashMap;

/// Orders documents by descending score and keeps at most `k`.
///
/// Equal scores are ordered by document id ascending so the output is stable
/// across runs regardless of map iteration order.
pub fn rank(scores: HashMap<DocId, f64>, k: usize) -> Vec<RankedDoc> {
    let mut ranked: Vec<RankedDoc> = scores.into_iter().map(|(docid, score)| RankedDoc { docid, score }).collect();
    ranked.sort_by(by_score_then_docid);
    ranked.truncate(k);
    ranked
}

fn by_score_then_docid(a: &RankedDoc, b: &RankedDoc) -> Ordering {
    b.score.total_cmp(&a.score).then_with(|| a.docid.cmp(&b.docid))
}
