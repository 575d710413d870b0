pub mod merge_drafts;
