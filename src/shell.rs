//! Line commands for the interactive studio shell.
//!
//! Positions typed by the user are 1-based; parsed commands carry 0-based
//! indices.

use crate::models::{parse_aspect_ratio, StyleTag, MAX_IMAGE_COUNT};
use crate::{Error, Result};
use std::path::PathBuf;

pub const HELP: &str = "\
Commands:
  style <ecommerce|lifestyle|artistic>   set the style for the next generation
  negative [text]                        set (or clear) elements to avoid
  count <1-4>                            number of images to generate
  aspect <1:1|3:4|4:3|9:16|16:9|clear>   set (or clear) the image aspect ratio
  ref <path> | ref clear                 set or clear the reference image
  generate [prompt]                      enhance the prompt and generate images
  select <n>                             make image n of the last generation current
  regenerate <feedback>                  regenerate the current image with feedback
  edit <path|current> [instruction]      transform an image in the current style
  video [--ref current|<path>] <prompt>  generate a video (Ctrl-C stops waiting)
  fav                                    add the current image to favorites
  favs                                   list favorites
  unfav <n>                              remove favorite n
  clearfavs                              remove all favorites
  save <current|video|n> [path]          save an artifact (n = favorite n)
  thumb <current|n> [path]               save a downscaled preview of an image
  reset                                  start over (favorites are kept)
  help                                   show this help
  quit                                   leave the studio

Ctrl-C stops waiting on a video; at the prompt it leaves the studio.";

/// Where an image for an edit or video comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    Current,
    Path(PathBuf),
}

impl ImageSource {
    fn parse(token: &str) -> Self {
        if token.eq_ignore_ascii_case("current") {
            ImageSource::Current
        } else {
            ImageSource::Path(PathBuf::from(token))
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveTarget {
    Current,
    Video,
    Favorite(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Style(StyleTag),
    Negative(Option<String>),
    Count(u8),
    AspectRatio(Option<String>),
    Reference(Option<PathBuf>),
    Generate(String),
    Select(usize),
    Regenerate(String),
    Edit {
        source: ImageSource,
        instruction: Option<String>,
    },
    Video {
        source: Option<ImageSource>,
        prompt: String,
    },
    Favorite,
    ListFavorites,
    Unfavorite(usize),
    ClearFavorites,
    Save {
        target: SaveTarget,
        path: Option<PathBuf>,
    },
    Thumbnail {
        target: SaveTarget,
        path: Option<PathBuf>,
    },
    Reset,
    Help,
    Quit,
}

impl Command {
    pub fn parse(line: &str) -> Result<Self> {
        let line = line.trim();
        let (word, rest) = split_word(line);
        if word.is_empty() {
            return Err(Error::Validation("Empty command".to_string()));
        }

        match word.to_ascii_lowercase().as_str() {
            "style" => Ok(Command::Style(rest.parse()?)),
            "negative" => Ok(Command::Negative(non_empty(rest))),
            "count" => {
                let count: u8 = rest.parse().map_err(|_| usage("count <1-4>"))?;
                if count == 0 || count > MAX_IMAGE_COUNT {
                    return Err(usage("count <1-4>"));
                }
                Ok(Command::Count(count))
            }
            "aspect" => match rest {
                "" => Err(usage("aspect <1:1|3:4|4:3|9:16|16:9|clear>")),
                "clear" => Ok(Command::AspectRatio(None)),
                ratio => Ok(Command::AspectRatio(Some(parse_aspect_ratio(ratio)?))),
            },
            "ref" => match rest {
                "" => Err(usage("ref <path> | ref clear")),
                "clear" => Ok(Command::Reference(None)),
                path => Ok(Command::Reference(Some(PathBuf::from(path)))),
            },
            "generate" | "gen" => Ok(Command::Generate(rest.to_string())),
            "select" => Ok(Command::Select(position(rest, "select <n>")?)),
            "regenerate" | "regen" => match non_empty(rest) {
                Some(feedback) => Ok(Command::Regenerate(feedback)),
                None => Err(usage("regenerate <feedback>")),
            },
            "edit" => {
                let (source, instruction) = split_word(rest);
                if source.is_empty() {
                    return Err(usage("edit <path|current> [instruction]"));
                }
                Ok(Command::Edit {
                    source: ImageSource::parse(source),
                    instruction: non_empty(instruction),
                })
            }
            "video" => parse_video(rest),
            "fav" => Ok(Command::Favorite),
            "favs" => Ok(Command::ListFavorites),
            "unfav" => Ok(Command::Unfavorite(position(rest, "unfav <n>")?)),
            "clearfavs" => Ok(Command::ClearFavorites),
            "save" => {
                let (target, path) = split_word(rest);
                let target = match target.to_ascii_lowercase().as_str() {
                    "current" => SaveTarget::Current,
                    "video" => SaveTarget::Video,
                    "" => return Err(usage("save <current|video|n> [path]")),
                    _ => SaveTarget::Favorite(position(target, "save <current|video|n> [path]")?),
                };
                Ok(Command::Save {
                    target,
                    path: non_empty(path).map(PathBuf::from),
                })
            }
            "thumb" => {
                let (target, path) = split_word(rest);
                let target = match target.to_ascii_lowercase().as_str() {
                    "current" => SaveTarget::Current,
                    _ => SaveTarget::Favorite(position(target, "thumb <current|n> [path]")?),
                };
                Ok(Command::Thumbnail {
                    target,
                    path: non_empty(path).map(PathBuf::from),
                })
            }
            "reset" => Ok(Command::Reset),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" => Ok(Command::Quit),
            other => Err(Error::Validation(format!(
                "Unknown command '{}'. Type 'help' for the list of commands",
                other
            ))),
        }
    }
}

fn parse_video(rest: &str) -> Result<Command> {
    let (first, after) = split_word(rest);
    let (source, prompt) = if first == "--ref" {
        let (source, prompt) = split_word(after);
        if source.is_empty() {
            return Err(usage("video [--ref current|<path>] <prompt>"));
        }
        (Some(ImageSource::parse(source)), prompt)
    } else {
        (None, rest)
    };

    match non_empty(prompt) {
        Some(prompt) => Ok(Command::Video { source, prompt }),
        None => Err(Error::Validation(
            "Enter a video prompt describing the motion or action".to_string(),
        )),
    }
}

fn split_word(input: &str) -> (&str, &str) {
    let input = input.trim_start();
    match input.find(char::is_whitespace) {
        Some(i) => (&input[..i], input[i..].trim()),
        None => (input, ""),
    }
}

fn non_empty(text: &str) -> Option<String> {
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

fn position(text: &str, usage_text: &str) -> Result<usize> {
    match text.trim().parse::<usize>() {
        Ok(n) if n >= 1 => Ok(n - 1),
        _ => Err(usage(usage_text)),
    }
}

fn usage(text: &str) -> Error {
    Error::Validation(format!("Usage: {}", text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_settings() {
        assert_eq!(
            Command::parse("style Lifestyle").unwrap(),
            Command::Style(StyleTag::Lifestyle)
        );
        assert_eq!(Command::parse("count 4").unwrap(), Command::Count(4));
        assert_eq!(
            Command::parse("negative text, watermark").unwrap(),
            Command::Negative(Some("text, watermark".to_string()))
        );
        assert_eq!(Command::parse("negative").unwrap(), Command::Negative(None));
        assert_eq!(Command::parse("ref clear").unwrap(), Command::Reference(None));
        assert_eq!(
            Command::parse("ref ./mug.png").unwrap(),
            Command::Reference(Some(PathBuf::from("./mug.png")))
        );
    }

    #[test]
    fn test_parse_aspect_ratio() {
        assert_eq!(
            Command::parse("aspect 9:16").unwrap(),
            Command::AspectRatio(Some("9:16".to_string()))
        );
        assert_eq!(Command::parse("aspect clear").unwrap(), Command::AspectRatio(None));
        assert!(Command::parse("aspect 2:1").is_err());
        assert!(Command::parse("aspect").is_err());
    }

    #[test]
    fn test_parse_thumbnail() {
        assert_eq!(
            Command::parse("thumb current").unwrap(),
            Command::Thumbnail {
                target: SaveTarget::Current,
                path: None,
            }
        );
        assert_eq!(
            Command::parse("thumb 2 out/small").unwrap(),
            Command::Thumbnail {
                target: SaveTarget::Favorite(1),
                path: Some(PathBuf::from("out/small")),
            }
        );
        assert!(Command::parse("thumb video").is_err());
        assert!(Command::parse("thumb").is_err());
    }

    #[test]
    fn test_parse_rejects_bad_counts() {
        assert!(Command::parse("count 0").is_err());
        assert!(Command::parse("count 5").is_err());
        assert!(Command::parse("count many").is_err());
    }

    #[test]
    fn test_generate_keeps_whole_prompt() {
        assert_eq!(
            Command::parse("generate  a red bicycle on a beach ").unwrap(),
            Command::Generate("a red bicycle on a beach".to_string())
        );
        // A bare generate relies on the reference image.
        assert_eq!(
            Command::parse("generate").unwrap(),
            Command::Generate(String::new())
        );
    }

    #[test]
    fn test_positions_are_one_based() {
        assert_eq!(Command::parse("select 2").unwrap(), Command::Select(1));
        assert_eq!(Command::parse("unfav 1").unwrap(), Command::Unfavorite(0));
        assert!(Command::parse("select 0").is_err());
        assert_eq!(
            Command::parse("save 3 out/best").unwrap(),
            Command::Save {
                target: SaveTarget::Favorite(2),
                path: Some(PathBuf::from("out/best")),
            }
        );
    }

    #[test]
    fn test_parse_edit() {
        assert_eq!(
            Command::parse("edit current put it on a wooden table").unwrap(),
            Command::Edit {
                source: ImageSource::Current,
                instruction: Some("put it on a wooden table".to_string()),
            }
        );
        assert_eq!(
            Command::parse("edit shoe.jpg").unwrap(),
            Command::Edit {
                source: ImageSource::Path(PathBuf::from("shoe.jpg")),
                instruction: None,
            }
        );
        assert!(Command::parse("edit").is_err());
    }

    #[test]
    fn test_parse_video() {
        assert_eq!(
            Command::parse("video slow pan across mountains").unwrap(),
            Command::Video {
                source: None,
                prompt: "slow pan across mountains".to_string(),
            }
        );
        assert_eq!(
            Command::parse("video --ref current orbit the product").unwrap(),
            Command::Video {
                source: Some(ImageSource::Current),
                prompt: "orbit the product".to_string(),
            }
        );
        assert!(matches!(
            Command::parse("video --ref current"),
            Err(Error::Validation(_))
        ));
        assert!(Command::parse("video").is_err());
    }

    #[test]
    fn test_unknown_and_empty_commands_are_errors() {
        assert!(matches!(Command::parse("dance"), Err(Error::Validation(_))));
        assert!(matches!(Command::parse("   "), Err(Error::Validation(_))));
        assert!(matches!(Command::parse("style noir"), Err(Error::Validation(_))));
    }

    #[test]
    fn test_simple_commands() {
        assert_eq!(Command::parse("fav").unwrap(), Command::Favorite);
        assert_eq!(Command::parse("favs").unwrap(), Command::ListFavorites);
        assert_eq!(Command::parse("clearfavs").unwrap(), Command::ClearFavorites);
        assert_eq!(Command::parse("RESET").unwrap(), Command::Reset);
        assert_eq!(Command::parse("exit").unwrap(), Command::Quit);
        assert_eq!(
            Command::parse("save current").unwrap(),
            Command::Save {
                target: SaveTarget::Current,
                path: None,
            }
        );
    }
}
