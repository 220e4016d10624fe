//! ターミナル表示シンク
//!
//! 受信したメッセージを著者・本文の2カラムテーブルで表示する。
//! 保持する行数は最大500行で、あふれた分は古い行から削除する。

use std::collections::VecDeque;
use std::io;
use std::time::Duration;

use ratatui::backend::CrosstermBackend;
use ratatui::crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use ratatui::crossterm::execute;
use ratatui::crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::layout::Constraint;
use ratatui::style::{Color, Style};
use ratatui::widgets::{Cell, Row, Table};
use ratatui::{Frame, Terminal};
use tokio::sync::{broadcast, mpsc};

use crate::youtube::types::{Author, Message, MessageBatch, MessageKind};

/// テーブルに保持する最大行数
const MAX_ROW_COUNT: usize = 500;

/// 著者名カラムの幅
const AUTHOR_COLUMN_WIDTH: u16 = 20;

/// キー入力のポーリング間隔
const INPUT_POLL_INTERVAL: Duration = Duration::from_millis(100);

pub struct Tui {
    rows: VecDeque<Message>,
}

impl Tui {
    pub fn new() -> Self {
        Self {
            rows: VecDeque::new(),
        }
    }

    /// TUIを起動する
    ///
    /// 終了キー（q / Esc / Ctrl-C）かシャットダウン信号で戻る。
    /// メッセージチャネルが閉じても画面は残し、終了キーを待つ。
    pub async fn run(
        mut self,
        mut batches: mpsc::Receiver<MessageBatch>,
        mut shutdown_rx: broadcast::Receiver<()>,
    ) -> io::Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let result = self
            .event_loop(&mut terminal, &mut batches, &mut shutdown_rx)
            .await;

        // どの経路で抜けても必ず端末を復元する
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }

    async fn event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
        batches: &mut mpsc::Receiver<MessageBatch>,
        shutdown_rx: &mut broadcast::Receiver<()>,
    ) -> io::Result<()> {
        // キー入力の読み取りはブロッキングなので専用スレッドに切り出し、
        // チャネル経由でイベントループへ送る
        let (input_tx, mut input_rx) = mpsc::channel::<Event>(16);
        let input_handle = tokio::task::spawn_blocking(move || loop {
            match event::poll(INPUT_POLL_INTERVAL) {
                Ok(true) => {
                    let Ok(ev) = event::read() else { break };
                    if input_tx.blocking_send(ev).is_err() {
                        break;
                    }
                }
                Ok(false) => {
                    if input_tx.is_closed() {
                        break;
                    }
                }
                Err(_) => break,
            }
        });

        let mut closed = false;
        loop {
            terminal.draw(|frame| self.draw(frame))?;

            tokio::select! {
                batch = batches.recv(), if !closed => {
                    match batch {
                        Some(batch) => self.push_batch(batch),
                        None => closed = true,
                    }
                }
                event = input_rx.recv() => {
                    let Some(event) = event else { break };
                    if is_quit_key(&event) {
                        break;
                    }
                }
                _ = shutdown_rx.recv() => break,
            }
        }

        drop(input_rx);
        let _ = input_handle.await;
        Ok(())
    }

    fn draw(&self, frame: &mut Frame) {
        let rows: Vec<Row> = self.rows.iter().map(message_row).collect();
        let table = Table::new(
            rows,
            [
                Constraint::Length(AUTHOR_COLUMN_WIDTH),
                Constraint::Min(10),
            ],
        );
        frame.render_widget(table, frame.area());
    }

    fn push_batch(&mut self, batch: MessageBatch) {
        for message in batch.items {
            self.rows.push_back(message);
        }
        // あふれた分は古い行から削除
        while self.rows.len() > MAX_ROW_COUNT {
            self.rows.pop_front();
        }
    }
}

impl Default for Tui {
    fn default() -> Self {
        Self::new()
    }
}

fn message_row(message: &Message) -> Row<'_> {
    let author_cell = match message.author.as_ref() {
        Some(author) => Cell::from(author.name.as_str())
            .style(Style::default().fg(author_color(author))),
        // 著者情報を持たないメッセージはカラムごと空にする
        None => Cell::from(""),
    };

    Row::new(vec![author_cell, Cell::from(display_text(message))])
}

/// 表示用の本文を組み立てる
///
/// スパチャは金額を前置する。
fn display_text(message: &Message) -> String {
    match &message.kind {
        MessageKind::SuperChat { amount, .. } if !amount.is_empty() => {
            format!("[{}] {}", amount, message.text)
        }
        _ => message.text.clone(),
    }
}

fn author_color(author: &Author) -> Color {
    match author {
        a if a.is_owner => Color::Yellow,
        a if a.is_moderator => Color::LightBlue,
        a if a.is_verified => Color::LightRed,
        a if a.is_sponsor => Color::LightGreen,
        _ => Color::White,
    }
}

fn is_quit_key(event: &Event) -> bool {
    let Event::Key(key) = event else { return false };
    if key.kind != KeyEventKind::Press {
        return false;
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => true,
        KeyCode::Char('c') => key.modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}
