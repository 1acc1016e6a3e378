#![allow(dead_code)]

use std::time::Duration;

use engine_bridge::BridgeConfig;

/// Answers the handshake, then reports two depths (deeper first) and a best
/// move for every search. Chatters on stderr during `uci`.
pub const RESPONSIVE_ENGINE: &str = r#"
while IFS= read -r line; do
  case "$line" in
    uci)
      echo "warming up" >&2
      echo "id name FakeAmazon"
      echo "option name UCI_Variant type combo default amazon var amazon"
      echo "uciok" ;;
    isready) echo "readyok" ;;
    "go depth"*)
      printf 'info depth 10 score cp 34 '
      printf 'pv e2e4\n'
      echo "info depth 8 score cp 99 pv d2d4"
      echo "bestmove e2e4" ;;
    quit) exit 0 ;;
  esac
done
"#;

/// Ignores its first search until told to `stop`, answers later ones.
pub const SLOW_FIRST_SEARCH_ENGINE: &str = r#"
n=0
while IFS= read -r line; do
  case "$line" in
    uci) echo "uciok" ;;
    isready) echo "readyok" ;;
    "go depth"*)
      n=$((n + 1))
      if [ "$n" -gt 1 ]; then
        echo "info depth 3 score mate 2 pv d1d8"
        echo "bestmove d1d8"
      fi ;;
    stop) echo "bestmove h1h2" ;;
    quit) exit 0 ;;
  esac
done
"#;

/// Completes the handshake and dies on the first search.
pub const CRASHING_ENGINE: &str = r#"
while IFS= read -r line; do
  case "$line" in
    uci) echo "uciok" ;;
    isready) echo "readyok" ;;
    "go depth"*) exit 3 ;;
  esac
done
"#;

/// Never says anything.
pub const SILENT_ENGINE: &str = "cat > /dev/null";

/// Bridge config running `script` under `sh -c`.
pub fn fake_engine(script: &str) -> BridgeConfig {
    let mut config = BridgeConfig::new("sh").with_args(["-c", script]);
    config.handshake_timeout = Duration::from_secs(5);
    config.analysis_timeout = Duration::from_secs(5);
    config
}

pub const AMAZON_ENDGAME_FEN: &str = "8/8/4k3/4r3/8/8/8/3AK3 w - -";

pub const SCANDINAVIAN: &str = r#"[Event "Casual"]
[White "Alpha"]
[Black "Beta"]
[Result "*"]
[FEN "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w - -"]

1. e4 d5 2. exd5 Qxd5 3. Nc3 Qa5 4. d4 Nf6 5. Nf3 Bf5 *
"#;
