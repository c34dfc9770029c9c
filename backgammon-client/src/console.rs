//! 控制台前端
//!
//! 从标准输入读取命令，用日志输出画面变化和音效。

use std::collections::HashMap;
use std::io::BufRead;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use protocol::PieceId;
use tracing::{info, warn};

use crate::board::{PieceColor, Point};
use crate::frontend::{AudioCue, InputSource, Renderer, Scene, Sound};
use crate::input::{InputEvent, Key, MouseButton};

/// 命令帮助
pub const HELP: &str = "commands: roll | reset | move <id> <x> <y> | down <x> <y> | up <x> <y> \
                        | motion <x> <y> | eyes <black|white> <delta> | quit";

/// 解析后的命令
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Input(InputEvent),
    /// 把棋子拖到目标位置
    MovePiece { id: PieceId, to: Point },
    Help,
}

/// 解析一行命令
pub fn parse_command(line: &str) -> Result<Command, String> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    let Some((&name, args)) = parts.split_first() else {
        return Err("empty command".to_string());
    };

    let point = |args: &[&str]| -> Result<Point, String> {
        match args {
            [x, y] => Ok(Point::new(parse_num(x)?, parse_num(y)?)),
            _ => Err(format!("{} expects <x> <y>", name)),
        }
    };

    let command = match name {
        "roll" => Command::Input(InputEvent::Key(Key::Space)),
        "reset" => Command::Input(InputEvent::Key(Key::Escape)),
        "quit" | "exit" => Command::Input(InputEvent::Quit),
        "help" => Command::Help,
        "down" => Command::Input(InputEvent::PointerDown {
            pos: point(args)?,
            button: MouseButton::Primary,
        }),
        "up" => Command::Input(InputEvent::PointerUp {
            pos: point(args)?,
            button: MouseButton::Primary,
        }),
        "motion" => Command::Input(InputEvent::PointerMotion { pos: point(args)? }),
        "move" => match args {
            [id, rest @ ..] => Command::MovePiece {
                id: parse_num(id)?,
                to: point(rest)?,
            },
            _ => return Err("move expects <id> <x> <y>".to_string()),
        },
        "eyes" => match args {
            [color, delta] => {
                let color = match *color {
                    "black" | "b" => PieceColor::Black,
                    "white" | "w" => PieceColor::White,
                    other => return Err(format!("unknown color: {}", other)),
                };
                Command::Input(InputEvent::Key(Key::AdjustEyes {
                    color,
                    delta: parse_num(delta)?,
                }))
            }
            _ => return Err("eyes expects <black|white> <delta>".to_string()),
        },
        other => return Err(format!("unknown command: {}", other)),
    };
    Ok(command)
}

fn parse_num<T: std::str::FromStr>(s: &str) -> Result<T, String> {
    s.parse().map_err(|_| format!("not a number: {}", s))
}

/// 控制台前端
pub struct ConsoleFrontend {
    lines: Receiver<String>,
    closed: bool,
    /// 上一帧的棋子位置
    positions: HashMap<PieceId, Point>,
    last_status: Option<String>,
}

impl ConsoleFrontend {
    /// 启动读取标准输入的后台线程
    pub fn spawn() -> Self {
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                let Ok(line) = line else { break };
                if tx.send(line).is_err() {
                    break;
                }
            }
        });
        info!("{}", HELP);
        Self::from_lines(rx)
    }

    pub fn from_lines(lines: Receiver<String>) -> Self {
        Self {
            lines,
            closed: false,
            positions: HashMap::new(),
            last_status: None,
        }
    }

    fn expand(&self, command: Command) -> Vec<InputEvent> {
        match command {
            Command::Input(event) => vec![event],
            Command::MovePiece { id, to } => {
                let Some(&from) = self.positions.get(&id) else {
                    warn!("No piece with id {}", id);
                    return Vec::new();
                };
                // 从中心抓起，偏移为零
                vec![
                    InputEvent::PointerDown {
                        pos: from,
                        button: MouseButton::Primary,
                    },
                    InputEvent::PointerMotion { pos: to },
                    InputEvent::PointerUp {
                        pos: to,
                        button: MouseButton::Primary,
                    },
                ]
            }
            Command::Help => {
                info!("{}", HELP);
                Vec::new()
            }
        }
    }
}

impl InputSource for ConsoleFrontend {
    fn poll(&mut self) -> Vec<InputEvent> {
        let mut events = Vec::new();
        loop {
            match self.lines.try_recv() {
                Ok(line) => {
                    if line.trim().is_empty() {
                        continue;
                    }
                    match parse_command(&line) {
                        Ok(command) => events.extend(self.expand(command)),
                        Err(e) => warn!("{}", e),
                    }
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    // 标准输入关闭视为退出
                    if !self.closed {
                        self.closed = true;
                        events.push(InputEvent::Quit);
                    }
                    break;
                }
            }
        }
        events
    }
}

impl Renderer for ConsoleFrontend {
    fn render(&mut self, scene: &Scene<'_>) {
        for piece in scene.pieces {
            let previous = self.positions.insert(piece.id, piece.pos);
            if previous.is_some_and(|p| p != piece.pos) {
                info!("Piece {} -> ({}, {})", piece.id, piece.pos.x, piece.pos.y);
            }
        }

        let (a, b) = scene.dice.values();
        let status = format!(
            "[{}] dice {}-{} | eyes black {} white {}",
            scene.status,
            a,
            b,
            scene.eyes.get(PieceColor::Black),
            scene.eyes.get(PieceColor::White),
        );
        if self.last_status.as_deref() != Some(status.as_str()) {
            info!("{}", status);
            self.last_status = Some(status);
        }
    }
}

impl AudioCue for ConsoleFrontend {
    fn play(&mut self, sound: Sound) {
        info!("Sound: {:?}", sound);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::BoardModel;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_parse_commands() {
        assert_eq!(
            parse_command("roll").unwrap(),
            Command::Input(InputEvent::Key(Key::Space))
        );
        assert_eq!(
            parse_command("  motion 10 -20 ").unwrap(),
            Command::Input(InputEvent::PointerMotion {
                pos: Point::new(10, -20)
            })
        );
        assert_eq!(
            parse_command("move 7 120 340").unwrap(),
            Command::MovePiece {
                id: 7,
                to: Point::new(120, 340)
            }
        );
        assert_eq!(
            parse_command("eyes white -1").unwrap(),
            Command::Input(InputEvent::Key(Key::AdjustEyes {
                color: PieceColor::White,
                delta: -1
            }))
        );

        assert!(parse_command("").is_err());
        assert!(parse_command("fly").is_err());
        assert!(parse_command("down 1").is_err());
        assert!(parse_command("eyes red 1").is_err());
        assert!(parse_command("move x 1 2").is_err());
    }

    #[test]
    fn test_move_expands_to_drag() {
        let (tx, rx) = mpsc::channel();
        let mut console = ConsoleFrontend::from_lines(rx);

        let mut rng = StdRng::seed_from_u64(0);
        let board = BoardModel::new(&mut rng);
        console.render(&Scene::from_board(&board, true));

        let from = board.piece(7).unwrap().pos;
        tx.send("move 7 120 340".to_string()).unwrap();
        tx.send("move 99 1 1".to_string()).unwrap();

        let events = console.poll();
        assert_eq!(
            events,
            vec![
                InputEvent::PointerDown {
                    pos: from,
                    button: MouseButton::Primary
                },
                InputEvent::PointerMotion {
                    pos: Point::new(120, 340)
                },
                InputEvent::PointerUp {
                    pos: Point::new(120, 340),
                    button: MouseButton::Primary
                },
            ]
        );
    }

    #[test]
    fn test_closed_input_quits_once() {
        let (tx, rx) = mpsc::channel::<String>();
        let mut console = ConsoleFrontend::from_lines(rx);
        drop(tx);

        assert_eq!(console.poll(), vec![InputEvent::Quit]);
        assert!(console.poll().is_empty());
    }
}
