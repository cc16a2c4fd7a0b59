//! Video candidate sweep
//!
//! The engine does not reliably report output locations for video jobs, so
//! the poller probes a fixed, priority-ordered list of name/folder guesses.
//! The list is an explicit data structure rather than inline control flow
//! so it stays independently testable and tunable.

/// One filename/folder guess.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub filename: String,
    pub subfolder: String,
}

/// Folders to probe, most likely first. The video save node writes under
/// the first entry; the rest cover engine configurations that redirect
/// output.
const CANDIDATE_FOLDERS: [&str; 4] = ["HV15Out", "", "output", "videos"];

/// Extensions the video save node is known to emit.
const CANDIDATE_EXTENSIONS: [&str; 2] = ["mp4", "gif"];

/// Sequential counter suffixes the save node appends.
const CANDIDATE_SUFFIXES: u32 = 5;

/// The full probe order: folder-major, so the most likely folder is
/// exhausted across every extension and counter before moving on.
pub fn video_candidates() -> Vec<Candidate> {
    let mut candidates = Vec::with_capacity(
        CANDIDATE_FOLDERS.len() * CANDIDATE_EXTENSIONS.len() * CANDIDATE_SUFFIXES as usize,
    );
    for folder in CANDIDATE_FOLDERS {
        for ext in CANDIDATE_EXTENSIONS {
            for i in 1..=CANDIDATE_SUFFIXES {
                candidates.push(Candidate {
                    filename: format!("vid_{:05}_.{}", i, ext),
                    subfolder: folder.to_string(),
                });
            }
        }
    }
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidate_count() {
        // 5 suffixes x 2 extensions x 4 folders
        assert_eq!(video_candidates().len(), 40);
    }

    #[test]
    fn test_folder_major_order() {
        let candidates = video_candidates();
        assert_eq!(candidates[0].subfolder, "HV15Out");
        assert_eq!(candidates[0].filename, "vid_00001_.mp4");
        assert_eq!(candidates[4].filename, "vid_00005_.mp4");
        assert_eq!(candidates[5].filename, "vid_00001_.gif");

        // All HV15Out probes come before any probe of the next folder
        let first_other = candidates
            .iter()
            .position(|c| c.subfolder != "HV15Out")
            .unwrap();
        assert_eq!(first_other, 10);
        assert_eq!(candidates[first_other].subfolder, "");
    }

    #[test]
    fn test_no_duplicates() {
        let candidates = video_candidates();
        let mut seen = std::collections::HashSet::new();
        for c in &candidates {
            assert!(seen.insert((c.filename.clone(), c.subfolder.clone())));
        }
    }
}
