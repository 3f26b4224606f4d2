//! Core game logic and state management
//!
//! This module contains the session engine. A [`Game`] owns everything about
//! one player's run through the contest: the active question, its countdown,
//! recorded answers, lifelines, score, and the round state machine. It is
//! driven by explicit calls from its host (player actions and alarm
//! deliveries) and reports back through the [`Host`] trait.

use std::{collections::HashMap, fmt::Debug, time::Duration};

use garde::Validate;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use thiserror::Error;

use crate::{
    AlarmMessage,
    answer::{AnswerKey, AnswerRecord, AnswerSheet, SubmitReason},
    config::Rules,
    constants,
    countdown::{Countdown, Tick},
    lifeline::{self, Lifeline, LifelineBank, RandomSource},
    prize::Prize,
    question::{Question, RoundSet},
    result::GameResult,
    session::{Host, Notice},
};

/// Interval between countdown alarms
const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Why a game ended by disqualification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Disqualification {
    /// Too many wrong answers or timeouts in a row
    ConsecutiveWrong,
    /// The player left the game before it ended
    Abandoned,
}

/// Represents the current phase of the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum State {
    /// A question is active and accepting an answer
    AwaitingAnswer {
        /// Zero-based round
        round: usize,
        /// Zero-based index within the round
        index: usize,
    },
    /// A round was cleared; waiting for the player to start the next one
    RoundTransition {
        /// Zero-based round that was cleared
        round: usize,
    },
    /// The game ended by disqualification
    Disqualified(Disqualification),
    /// The game ended because a round gate was not met
    Eliminated {
        /// Zero-based round that was failed
        round: usize,
        /// Cumulative score at the gate
        score: u32,
        /// Score that would have passed
        required: u32,
    },
    /// The final round is complete
    Finished {
        /// Final score
        score: u32,
        /// Prize won, if any
        prize: Option<Prize>,
    },
}

impl State {
    /// Whether the game has ended
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Disqualified(_) | Self::Eliminated { .. } | Self::Finished { .. }
        )
    }
}

/// Operations refused by the engine
///
/// A refused operation leaves the game exactly as it was.
#[derive(Error, Serialize, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The active question already has a recorded answer
    #[error("this question has already been answered")]
    AlreadyAnswered,
    /// The lifeline was already used this round
    #[error("{0} already used")]
    LifelineUsed(Lifeline),
    /// The bonus is already armed for this round
    #[error("bonus is already active")]
    BonusAlreadyArmed,
    /// An answer was submitted without an option
    #[error("select an option first or skip")]
    NothingSelected,
    /// The option is not one of the question's options
    #[error("option is not part of this question")]
    UnknownOption,
    /// The option was removed by 50/50
    #[error("option was removed by 50/50")]
    OptionHidden,
    /// No question is active
    #[error("no question is awaiting an answer")]
    NotAwaitingAnswer,
    /// The requested question cannot be entered
    #[error("question {index} of round {round} is not reachable")]
    OutOfRange {
        /// Zero-based round requested
        round: usize,
        /// Zero-based index requested
        index: usize,
    },
    /// No round is waiting to be started
    #[error("no round is waiting to start")]
    NotInTransition,
    /// The supplied rules failed validation
    #[error("invalid rules: {0}")]
    InvalidRules(String),
}

/// A view of the game for rendering
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    /// Current phase
    pub state: State,
    /// Cumulative score
    pub score: u32,
    /// Wrong answers or timeouts in a row
    pub consecutive_wrong: u32,
    /// Active question, when one is active
    pub question: Option<QuestionView>,
    /// Lifelines still available in the current round
    pub lifelines: Vec<Lifeline>,
    /// Whether the bonus is armed in the current round
    pub bonus_armed: bool,
}

/// The active question as the player sees it
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize)]
pub struct QuestionView {
    /// Zero-based round
    pub round: usize,
    /// Zero-based index within the round
    pub index: usize,
    /// Number of questions in the round
    pub count: usize,
    /// Question text
    pub prompt: String,
    /// Category label
    pub category: String,
    /// Options still visible
    pub options: Vec<String>,
    /// Highlighted option
    pub selected: Option<String>,
    /// Seconds on the clock
    pub seconds: u32,
    /// Recorded answer, once submitted
    pub answer: Option<AnswerRecord>,
    /// The correct option, revealed once submitted
    pub correct: Option<String>,
}

impl Snapshot {
    /// Converts the snapshot to a JSON string for transmission
    ///
    /// # Panics
    ///
    /// This method panics if serialization fails, which should never happen
    /// with the default JSON serializer for well-formed data.
    pub fn to_message(&self) -> String {
        serde_json::to_string(self).expect("default serializer cannot fail")
    }
}

/// The session engine for one player
pub struct Game<R = fastrand::Rng> {
    /// Questions of every round
    rounds: RoundSet,
    /// Timing, disqualification, and gate rules
    rules: Rules,
    /// Player the result is recorded for
    player: String,
    /// Current phase
    state: State,
    /// Zero-based round most recently entered
    round: usize,
    /// Cumulative score
    score: u32,
    /// Wrong answers or timeouts in a row
    consecutive_wrong: u32,
    /// Lifelines of each round
    lifelines: [LifelineBank; constants::game::ROUND_COUNT],
    /// Whether the bonus is armed in each round
    bonus_armed: [bool; constants::game::ROUND_COUNT],
    /// Every recorded answer
    answers: AnswerSheet,
    /// Countdown of the first unanswered question of the round
    countdown: Countdown,
    /// Options left visible by 50/50, per question
    reveals: HashMap<AnswerKey, Vec<String>>,
    /// Highlighted option on the active question
    selected: Option<String>,
    /// Randomness for 50/50
    rng: R,
}

impl<R> Debug for Game<R> {
    /// Custom debug implementation that avoids printing the question bank
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Game")
            .field("player", &self.player)
            .field("state", &self.state)
            .field("score", &self.score)
            .finish_non_exhaustive()
    }
}

impl Game {
    /// Creates a game with the default rules
    ///
    /// The game starts in `AwaitingAnswer` on the first question; call
    /// [`Game::play`] to start its countdown.
    pub fn new(rounds: RoundSet, player: impl Into<String>) -> Self {
        Self::build(rounds, Rules::default(), player.into(), fastrand::Rng::new())
    }
}

impl<R: RandomSource> Game<R> {
    /// Creates a game with custom rules and randomness
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidRules` if `rules` fail validation.
    pub fn with_rules(
        rounds: RoundSet,
        rules: Rules,
        player: impl Into<String>,
        rng: R,
    ) -> Result<Self, Error> {
        rules
            .validate()
            .map_err(|report| Error::InvalidRules(report.to_string()))?;
        Ok(Self::build(rounds, rules, player.into(), rng))
    }

    fn build(rounds: RoundSet, rules: Rules, player: String, rng: R) -> Self {
        Self {
            rounds,
            rules,
            player,
            state: State::AwaitingAnswer { round: 0, index: 0 },
            round: 0,
            score: 0,
            consecutive_wrong: 0,
            lifelines: Default::default(),
            bonus_armed: [false; constants::game::ROUND_COUNT],
            answers: AnswerSheet::default(),
            countdown: Countdown::default(),
            reveals: HashMap::new(),
            selected: None,
            rng,
        }
    }

    /// Current phase
    pub fn state(&self) -> State {
        self.state
    }

    /// Cumulative score
    pub fn score(&self) -> u32 {
        self.score
    }

    /// Wrong answers or timeouts in a row
    pub fn consecutive_wrong(&self) -> u32 {
        self.consecutive_wrong
    }

    /// Player the game belongs to
    pub fn player(&self) -> &str {
        &self.player
    }

    /// Rules in force
    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    /// Seconds left on the active question
    pub fn time_remaining(&self) -> u32 {
        self.countdown.remaining()
    }

    /// Lifelines of the zero-based `round`
    pub fn lifelines(&self, round: usize) -> Option<&LifelineBank> {
        self.lifelines.get(round)
    }

    /// Whether the bonus is armed in the zero-based `round`
    pub fn bonus_armed(&self, round: usize) -> bool {
        self.bonus_armed.get(round).copied().unwrap_or(false)
    }

    /// Recorded answer for a question, by zero-based round and index
    pub fn answer(&self, round: usize, index: usize) -> Option<&AnswerRecord> {
        let question = self.rounds.question(round, index)?;
        self.answers.get(Self::key(round, question))
    }

    /// Every recorded answer
    pub fn answers(&self) -> &AnswerSheet {
        &self.answers
    }

    /// Highlighted option on the active question
    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// The active question
    pub fn current_question(&self) -> Option<&Question> {
        match self.state {
            State::AwaitingAnswer { round, index } => self.rounds.question(round, index),
            _ => None,
        }
    }

    /// Options of the active question that are still visible
    pub fn visible_options(&self) -> Vec<&str> {
        let Some(question) = self.current_question() else {
            return Vec::new();
        };
        question
            .options()
            .iter()
            .filter(|option| self.is_visible(option))
            .map(String::as_str)
            .collect_vec()
    }

    /// Builds a view of the game for rendering
    pub fn snapshot(&self) -> Snapshot {
        let round = self.round;
        let question = match self.state {
            State::AwaitingAnswer { round, index } => {
                self.rounds.question(round, index).map(|question| {
                    let answer = self.answers.get(Self::key(round, question)).cloned();
                    QuestionView {
                        round,
                        index,
                        count: self.rounds.round_len(round),
                        prompt: question.prompt().to_owned(),
                        category: question.category().to_owned(),
                        options: self
                            .visible_options()
                            .into_iter()
                            .map(str::to_owned)
                            .collect_vec(),
                        selected: self.selected.clone(),
                        seconds: self.countdown.remaining(),
                        correct: answer.as_ref().map(|_| question.correct().to_owned()),
                        answer,
                    }
                })
            }
            _ => None,
        };

        Snapshot {
            state: self.state,
            score: self.score,
            consecutive_wrong: self.consecutive_wrong,
            question,
            lifelines: self
                .lifelines
                .get(round)
                .map(LifelineBank::remaining)
                .unwrap_or_default(),
            bonus_armed: self.bonus_armed(round),
        }
    }

    /// Starts the countdown of the first question
    ///
    /// # Errors
    ///
    /// Returns `Error::NotAwaitingAnswer` if the game has moved on.
    pub fn play<H: Host>(&mut self, host: &mut H) -> Result<(), Error> {
        self.start_question(0, 0, host)
    }

    /// Makes a question of the current round active
    ///
    /// Only questions up to the first unanswered one can be entered. The
    /// countdown belongs to that first unanswered question: it starts when the
    /// question is first entered and keeps running while the player looks back
    /// at answered questions, which show their recorded answer. A 50/50
    /// applied to a question stays in force whenever it is entered again.
    ///
    /// # Errors
    ///
    /// * `Error::NotAwaitingAnswer` - No round is in progress
    /// * `Error::OutOfRange` - The question is not in the current round or
    ///   lies beyond the first unanswered question
    pub fn start_question<H: Host>(
        &mut self,
        round: usize,
        index: usize,
        host: &mut H,
    ) -> Result<(), Error> {
        let State::AwaitingAnswer { round: current, .. } = self.state else {
            return Err(Self::reject(Error::NotAwaitingAnswer, host));
        };

        let frontier = self.answers.answered_in_round(current);
        if round != current || index >= self.rounds.round_len(round) || index > frontier {
            return Err(Self::reject(Error::OutOfRange { round, index }, host));
        }

        self.enter_question(round, index, host);
        Ok(())
    }

    /// Counts down one second on the first unanswered question
    ///
    /// When the countdown reaches zero that question is submitted as a
    /// timeout, even if the player is looking at an earlier one. Ticks outside
    /// a round are ignored.
    ///
    /// # Errors
    ///
    /// Propagates errors from the timeout submission, which do not occur for
    /// an unanswered question.
    pub fn tick<H: Host>(&mut self, host: &mut H) -> Result<Tick, Error> {
        let Some((round, index)) = self.frontier() else {
            return Ok(Tick::Idle);
        };

        let tick = self.countdown.tick();
        match tick {
            Tick::Idle => {}
            Tick::Running(seconds) => {
                tracing::debug!(round, index, seconds, "tick");
                host.schedule_alarm(AlarmMessage::Tick { round, index }, TICK_INTERVAL);
            }
            Tick::Expired => {
                self.focus(round, index);
                self.submit(None, SubmitReason::Timeout, host)?;
            }
        }
        Ok(tick)
    }

    /// Handles an alarm previously scheduled through the host
    ///
    /// Alarms for any question other than the first unanswered one are stale
    /// and ignored.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`Game::tick`].
    pub fn receive_alarm<H: Host>(
        &mut self,
        alarm: &AlarmMessage,
        host: &mut H,
    ) -> Result<Tick, Error> {
        match *alarm {
            AlarmMessage::Tick { round, index } if self.frontier() == Some((round, index)) => {
                self.tick(host)
            }
            AlarmMessage::Tick { .. } => Ok(Tick::Idle),
        }
    }

    /// Highlights an option on the active question
    ///
    /// # Errors
    ///
    /// * `Error::NotAwaitingAnswer` - No question is active
    /// * `Error::AlreadyAnswered` - The question has a recorded answer
    /// * `Error::UnknownOption` - The option does not belong to the question
    /// * `Error::OptionHidden` - The option was removed by 50/50
    pub fn select<H: Host>(&mut self, option: &str, host: &mut H) -> Result<(), Error> {
        let (round, index) = self.active(host)?;
        if self.is_answered(round, index) {
            return Err(Self::reject(Error::AlreadyAnswered, host));
        }
        self.check_option(option, host)?;

        self.selected = Some(option.to_owned());
        Ok(())
    }

    /// Submits the highlighted option
    ///
    /// # Errors
    ///
    /// See [`Game::submit`].
    pub fn submit_selected<H: Host>(
        &mut self,
        reason: SubmitReason,
        host: &mut H,
    ) -> Result<AnswerRecord, Error> {
        let selected = self.selected.clone();
        self.submit(selected.as_deref(), reason, host)
    }

    /// Spends the skip lifeline on the active question
    ///
    /// # Errors
    ///
    /// See [`Game::submit`].
    pub fn skip<H: Host>(&mut self, host: &mut H) -> Result<AnswerRecord, Error> {
        self.submit(None, SubmitReason::Skip, host)
    }

    /// Records an answer for the active question and moves the game on
    ///
    /// A correct answer earns one point, plus one when the bonus was requested
    /// or armed and the bonus lifeline is still available. A wrong answer or a
    /// timeout earns nothing and extends the run of wrong answers; a correct
    /// answer ends it. A skip earns nothing and leaves the run untouched.
    /// A wrong answer leaves an armed bonus armed.
    ///
    /// # Errors
    ///
    /// * `Error::NotAwaitingAnswer` - No question is active
    /// * `Error::AlreadyAnswered` - The question has a recorded answer
    /// * `Error::LifelineUsed` - A skip was requested after the skip was used
    /// * `Error::NothingSelected` - An answer was submitted without an option
    /// * `Error::UnknownOption` - The option does not belong to the question
    /// * `Error::OptionHidden` - The option was removed by 50/50
    pub fn submit<H: Host>(
        &mut self,
        option: Option<&str>,
        reason: SubmitReason,
        host: &mut H,
    ) -> Result<AnswerRecord, Error> {
        let (round, index) = self.active(host)?;
        let Some(question) = self.rounds.question(round, index).cloned() else {
            return Err(Self::reject(Error::OutOfRange { round, index }, host));
        };
        let key = Self::key(round, &question);
        if self.answers.is_submitted(key) {
            return Err(Self::reject(Error::AlreadyAnswered, host));
        }

        let record = match reason {
            SubmitReason::Timeout => {
                self.consecutive_wrong += 1;
                host.send_notice(&Notice::TimedOut);
                AnswerRecord::timed_out()
            }
            SubmitReason::Skip => {
                if !self.lifelines[round].consume(Lifeline::Skip) {
                    return Err(Self::reject(Error::LifelineUsed(Lifeline::Skip), host));
                }
                host.send_notice(&Notice::Skipped);
                AnswerRecord::skipped()
            }
            SubmitReason::Normal | SubmitReason::Bonus => {
                let Some(option) = option else {
                    return Err(Self::reject(Error::NothingSelected, host));
                };
                self.check_option(option, host)?;

                let is_correct = question.is_correct(option);
                let mut points = 0;
                if is_correct {
                    points = constants::points::CORRECT;
                    self.consecutive_wrong = 0;

                    let bonus_requested =
                        reason == SubmitReason::Bonus || self.bonus_armed[round];
                    if !bonus_requested {
                        host.send_notice(&Notice::Correct { points });
                    } else if self.lifelines[round].consume(Lifeline::Bonus) {
                        points += constants::points::BONUS;
                        self.bonus_armed[round] = false;
                        host.send_notice(&Notice::BonusAwarded { points });
                    } else {
                        host.send_notice(&Notice::BonusUnavailable);
                        host.send_notice(&Notice::Correct { points });
                    }
                } else {
                    self.consecutive_wrong += 1;
                    host.send_notice(&Notice::Wrong);
                }
                self.selected = Some(option.to_owned());
                AnswerRecord::answered(option.to_owned(), is_correct, points)
            }
        };

        self.cancel_pending_alarm(host);
        self.countdown.stop();

        self.score += record.points();
        self.answers.record(key, record.clone());
        tracing::info!(
            player = %self.player,
            round,
            index,
            ?reason,
            points = record.points(),
            score = self.score,
            consecutive_wrong = self.consecutive_wrong,
            "answer recorded"
        );

        self.advance(round, index, reason == SubmitReason::Skip, host);
        Ok(record)
    }

    /// Hides all but the correct option and one incorrect option
    ///
    /// # Returns
    ///
    /// The options left visible, in display order
    ///
    /// # Errors
    ///
    /// * `Error::NotAwaitingAnswer` - No question is active
    /// * `Error::AlreadyAnswered` - The question has a recorded answer
    /// * `Error::LifelineUsed` - 50/50 was already used this round
    pub fn apply_fifty_fifty<H: Host>(&mut self, host: &mut H) -> Result<Vec<String>, Error> {
        let (round, index) = self.active(host)?;
        if self.is_answered(round, index) {
            return Err(Self::reject(Error::AlreadyAnswered, host));
        }
        let Some(question) = self.rounds.question(round, index) else {
            return Err(Self::reject(Error::OutOfRange { round, index }, host));
        };
        if !self.lifelines[round].is_available(Lifeline::FiftyFifty) {
            return Err(Self::reject(
                Error::LifelineUsed(Lifeline::FiftyFifty),
                host,
            ));
        }

        let key = Self::key(round, question);
        let remaining = lifeline::fifty_fifty(question, &mut self.rng);
        self.lifelines[round].consume(Lifeline::FiftyFifty);
        if self
            .selected
            .as_ref()
            .is_some_and(|selected| !remaining.contains(selected))
        {
            self.selected = None;
        }
        self.reveals.insert(key, remaining.clone());

        tracing::info!(player = %self.player, round, index, "50/50 applied");
        host.send_notice(&Notice::FiftyFiftyApplied {
            remaining: remaining.clone(),
        });
        Ok(remaining)
    }

    /// Arms the bonus for the next correct answer in the current round
    ///
    /// Arming does not consume the lifeline; it is consumed by the correct
    /// answer that collects the extra point.
    ///
    /// # Errors
    ///
    /// * `Error::NotAwaitingAnswer` - No question is active
    /// * `Error::AlreadyAnswered` - The question has a recorded answer
    /// * `Error::LifelineUsed` - The bonus was already used this round
    /// * `Error::BonusAlreadyArmed` - The bonus is already armed
    pub fn arm_bonus<H: Host>(&mut self, host: &mut H) -> Result<(), Error> {
        let (round, index) = self.active(host)?;
        if self.is_answered(round, index) {
            return Err(Self::reject(Error::AlreadyAnswered, host));
        }
        if !self.lifelines[round].is_available(Lifeline::Bonus) {
            return Err(Self::reject(Error::LifelineUsed(Lifeline::Bonus), host));
        }
        if self.bonus_armed[round] {
            return Err(Self::reject(Error::BonusAlreadyArmed, host));
        }

        self.bonus_armed[round] = true;
        tracing::info!(player = %self.player, round, "bonus armed");
        host.send_notice(&Notice::BonusArmed);
        Ok(())
    }

    /// Starts the next round after a cleared round
    ///
    /// # Errors
    ///
    /// Returns `Error::NotInTransition` unless a round was just cleared.
    pub fn confirm_next_round<H: Host>(&mut self, host: &mut H) -> Result<(), Error> {
        let State::RoundTransition { round } = self.state else {
            return Err(Self::reject(Error::NotInTransition, host));
        };

        self.bonus_armed[round] = false;
        tracing::info!(player = %self.player, round = round + 1, "round started");
        self.enter_question(round + 1, 0, host);
        Ok(())
    }

    /// Ends the game because the player left
    ///
    /// Has no effect once the game has ended.
    pub fn abandon<H: Host>(&mut self, host: &mut H) {
        if self.state.is_terminal() {
            return;
        }
        self.cancel_pending_alarm(host);
        self.countdown.stop();
        self.disqualify(Disqualification::Abandoned, host);
    }

    /// Moves on after a recorded answer
    fn advance<H: Host>(&mut self, round: usize, index: usize, skipped: bool, host: &mut H) {
        if !skipped && self.consecutive_wrong >= self.rules.consecutive_wrong_limit() {
            self.disqualify(Disqualification::ConsecutiveWrong, host);
            return;
        }

        if index + 1 < self.rounds.round_len(round) {
            self.enter_question(round, index + 1, host);
        } else {
            self.complete_round(round, host);
        }
    }

    /// Applies the gate at the end of `round`, or finishes after the last one
    fn complete_round<H: Host>(&mut self, round: usize, host: &mut H) {
        self.selected = None;

        let Some(gate) = self.rules.gate_after(round) else {
            self.finish(host);
            return;
        };

        if gate.admits(self.score) {
            self.state = State::RoundTransition { round };
            tracing::info!(player = %self.player, round, score = self.score, "round cleared");
            host.send_notice(&Notice::RoundCleared {
                round,
                score: self.score,
            });
        } else {
            let required = gate.required();
            self.state = State::Eliminated {
                round,
                score: self.score,
                required,
            };
            tracing::info!(
                player = %self.player,
                round,
                score = self.score,
                required,
                "round failed"
            );
            host.send_notice(&Notice::RoundFailed {
                round,
                score: self.score,
                required,
            });
        }
    }

    /// Awards the prize and stores the result
    fn finish<H: Host>(&mut self, host: &mut H) {
        let prize = Prize::for_score(self.score);
        self.state = State::Finished {
            score: self.score,
            prize,
        };
        tracing::info!(player = %self.player, score = self.score, ?prize, "game finished");

        let result = GameResult::new(self.player.clone(), self.score, prize);
        if let Err(e) = host.save_result(&result) {
            tracing::warn!(player = %self.player, error = %e, "failed to save result");
            host.send_notice(&e.into());
        }

        host.send_notice(&Notice::Finished {
            score: self.score,
            prize,
        });
    }

    fn disqualify<H: Host>(&mut self, reason: Disqualification, host: &mut H) {
        self.state = State::Disqualified(reason);
        self.selected = None;
        tracing::info!(player = %self.player, ?reason, score = self.score, "disqualified");
        host.send_notice(&reason.into());
    }

    /// Enters a question without checking reachability
    ///
    /// The countdown is started only the first time an unanswered question
    /// is entered; coming back to it leaves the running countdown alone.
    fn enter_question<H: Host>(&mut self, round: usize, index: usize, host: &mut H) {
        self.focus(round, index);

        let seconds = if self.is_answered(round, index) {
            None
        } else {
            if !self.countdown.is_running() {
                self.countdown.start(self.rules.time_limit_seconds());
                host.schedule_alarm(AlarmMessage::Tick { round, index }, TICK_INTERVAL);
            }
            Some(self.countdown.remaining())
        };

        tracing::debug!(round, index, ?seconds, "question started");
        host.send_notice(&Notice::QuestionStarted {
            round,
            index,
            count: self.rounds.round_len(round),
            seconds,
        });
    }

    /// Makes a question active without touching the countdown
    fn focus(&mut self, round: usize, index: usize) {
        self.state = State::AwaitingAnswer { round, index };
        self.round = round;
        self.selected = self
            .answer(round, index)
            .and_then(AnswerRecord::selected)
            .map(str::to_owned);
    }

    /// The first unanswered question of the round in progress
    fn frontier(&self) -> Option<(usize, usize)> {
        let State::AwaitingAnswer { round, .. } = self.state else {
            return None;
        };
        let index = self.answers.answered_in_round(round);
        (index < self.rounds.round_len(round)).then_some((round, index))
    }

    /// Withdraws the alarm of a countdown that is still running
    fn cancel_pending_alarm<H: Host>(&self, host: &mut H) {
        if !self.countdown.is_running() {
            return;
        }
        if let Some((round, index)) = self.frontier() {
            host.cancel_alarm(AlarmMessage::Tick { round, index });
        }
    }

    /// The active question's position, or a rejection if there is none
    fn active<H: Host>(&self, host: &mut H) -> Result<(usize, usize), Error> {
        match self.state {
            State::AwaitingAnswer { round, index } => Ok((round, index)),
            _ => Err(Self::reject(Error::NotAwaitingAnswer, host)),
        }
    }

    fn check_option<H: Host>(&self, option: &str, host: &mut H) -> Result<(), Error> {
        let known = self
            .current_question()
            .is_some_and(|question| question.has_option(option));
        if !known {
            return Err(Self::reject(Error::UnknownOption, host));
        }
        if !self.is_visible(option) {
            return Err(Self::reject(Error::OptionHidden, host));
        }
        Ok(())
    }

    fn is_visible(&self, option: &str) -> bool {
        let State::AwaitingAnswer { round, index } = self.state else {
            return true;
        };
        self.rounds
            .question(round, index)
            .and_then(|question| self.reveals.get(&Self::key(round, question)))
            .is_none_or(|visible| visible.iter().any(|v| v == option))
    }

    fn is_answered(&self, round: usize, index: usize) -> bool {
        self.answer(round, index).is_some()
    }

    fn key(round: usize, question: &Question) -> AnswerKey {
        AnswerKey {
            round,
            question_id: question.id(),
        }
    }

    fn reject<H: Host>(error: Error, host: &mut H) -> Error {
        tracing::warn!(%error, "operation rejected");
        host.send_notice(&error.clone().into());
        error
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::{
        config::RoundGate,
        result::{self, MemoryStore, ResultStore},
    };

    #[derive(Default)]
    struct MockHost {
        notices: Vec<Notice>,
        scheduled: Vec<(AlarmMessage, Duration)>,
        cancelled: Vec<AlarmMessage>,
        store: MemoryStore,
        store_down: bool,
    }

    impl Host for MockHost {
        fn send_notice(&mut self, notice: &Notice) {
            self.notices.push(notice.clone());
        }

        fn schedule_alarm(&mut self, alarm: AlarmMessage, after: Duration) {
            self.scheduled.push((alarm, after));
        }

        fn cancel_alarm(&mut self, alarm: AlarmMessage) {
            self.cancelled.push(alarm);
        }

        fn save_result(&mut self, result: &GameResult) -> Result<(), result::Error> {
            if self.store_down {
                Err(result::Error::Unavailable)
            } else {
                self.store.save_result(result)
            }
        }
    }

    impl MockHost {
        fn last_notice(&self) -> Option<&Notice> {
            self.notices.last()
        }

        fn saw(&self, notice: &Notice) -> bool {
            self.notices.contains(notice)
        }
    }

    const RIGHT: &str = "A";
    const WRONG: &str = "B";

    fn bank(sizes: [usize; 3]) -> RoundSet {
        let questions = sizes.iter().enumerate().flat_map(|(round, size)| {
            (0..*size).map(move |i| {
                Question::new(
                    i as u32 + 1,
                    format!("Round {} question {}", round + 1, i + 1),
                    vec!["A".into(), "B".into(), "C".into(), "D".into()],
                    "A",
                    "General",
                    round as u8 + 1,
                )
            })
        });
        RoundSet::new(questions).unwrap()
    }

    fn new_game(sizes: [usize; 3]) -> (Game, MockHost) {
        let mut host = MockHost::default();
        let mut game = Game::with_rules(
            bank(sizes),
            Rules::default(),
            "player-1",
            fastrand::Rng::with_seed(7),
        )
        .unwrap();
        game.play(&mut host).unwrap();
        (game, host)
    }

    fn answer(game: &mut Game, host: &mut MockHost, option: &str) -> AnswerRecord {
        game.submit(Some(option), SubmitReason::Normal, host).unwrap()
    }

    fn answer_all(game: &mut Game, host: &mut MockHost, count: usize) {
        for _ in 0..count {
            answer(game, host, RIGHT);
        }
    }

    #[test]
    fn test_new_game_starts_on_first_question() {
        let game = Game::new(bank([2, 1, 1]), "player-1");
        assert_eq!(game.state(), State::AwaitingAnswer { round: 0, index: 0 });
        assert_eq!(game.score(), 0);
        assert_eq!(game.player(), "player-1");
        assert_eq!(game.time_remaining(), 0);
    }

    #[test]
    fn test_play_arms_countdown() {
        let (game, host) = new_game([2, 1, 1]);
        assert_eq!(game.time_remaining(), 30);
        assert_eq!(
            host.scheduled,
            vec![(AlarmMessage::Tick { round: 0, index: 0 }, Duration::from_secs(1))]
        );
        assert_eq!(
            host.last_notice(),
            Some(&Notice::QuestionStarted {
                round: 0,
                index: 0,
                count: 2,
                seconds: Some(30),
            })
        );
    }

    #[test]
    fn test_invalid_rules_rejected() {
        let rules = Rules::new(
            Duration::from_secs(1),
            3,
            [RoundGate::AtLeast(6), RoundGate::Above(15)],
        );
        let result = Game::with_rules(bank([1, 1, 1]), rules, "p", fastrand::Rng::new());
        assert!(matches!(result, Err(Error::InvalidRules(_))));
    }

    #[test]
    fn test_unpassable_gate_rejected() {
        let json = r#"{"time_limit":30,"consecutive_wrong_limit":3,"gates":[{"Above":4294967295},{"Above":15}]}"#;
        let rules: Rules = serde_json::from_str(json).unwrap();
        let result = Game::with_rules(bank([2, 1, 1]), rules, "p", fastrand::Rng::new());
        assert!(matches!(result, Err(Error::InvalidRules(_))));
    }

    #[test]
    fn test_correct_answer_scores_one() {
        let (mut game, mut host) = new_game([3, 1, 1]);
        let record = answer(&mut game, &mut host, RIGHT);

        assert!(record.is_correct());
        assert_eq!(record.points(), 1);
        assert_eq!(game.score(), 1);
        assert!(host.saw(&Notice::Correct { points: 1 }));
        assert_eq!(game.state(), State::AwaitingAnswer { round: 0, index: 1 });
        assert!(host
            .cancelled
            .contains(&AlarmMessage::Tick { round: 0, index: 0 }));
        assert_eq!(game.time_remaining(), 30);
    }

    #[test]
    fn test_wrong_answer_scores_nothing() {
        let (mut game, mut host) = new_game([3, 1, 1]);
        let record = answer(&mut game, &mut host, WRONG);

        assert!(!record.is_correct());
        assert_eq!(record.points(), 0);
        assert_eq!(record.selected(), Some(WRONG));
        assert_eq!(game.score(), 0);
        assert_eq!(game.consecutive_wrong(), 1);
        assert!(host.saw(&Notice::Wrong));
    }

    #[test]
    fn test_correct_answer_resets_wrong_run() {
        let (mut game, mut host) = new_game([4, 1, 1]);
        answer(&mut game, &mut host, WRONG);
        answer(&mut game, &mut host, WRONG);
        assert_eq!(game.consecutive_wrong(), 2);

        answer(&mut game, &mut host, RIGHT);
        assert_eq!(game.consecutive_wrong(), 0);
    }

    #[test]
    fn test_resubmission_rejected_without_changes() {
        let (mut game, mut host) = new_game([3, 1, 1]);
        answer(&mut game, &mut host, WRONG);
        game.start_question(0, 0, &mut host).unwrap();

        let score = game.score();
        let wrong = game.consecutive_wrong();
        let result = game.submit(Some(RIGHT), SubmitReason::Normal, &mut host);

        assert_eq!(result, Err(Error::AlreadyAnswered));
        assert_eq!(game.score(), score);
        assert_eq!(game.consecutive_wrong(), wrong);
        assert_eq!(game.answer(0, 0).unwrap().selected(), Some(WRONG));
        assert_eq!(game.answers().len(), 1);
        assert_eq!(
            host.last_notice(),
            Some(&Notice::Rejected(Error::AlreadyAnswered))
        );
    }

    #[test]
    fn test_revisit_keeps_countdown_running() {
        let (mut game, mut host) = new_game([3, 1, 1]);
        answer(&mut game, &mut host, WRONG);
        let scheduled = host.scheduled.len();

        game.start_question(0, 0, &mut host).unwrap();
        assert_eq!(game.selected(), Some(WRONG));
        assert_eq!(game.time_remaining(), 30);
        assert_eq!(host.scheduled.len(), scheduled);
        assert_eq!(
            host.last_notice(),
            Some(&Notice::QuestionStarted {
                round: 0,
                index: 0,
                count: 3,
                seconds: None,
            })
        );

        assert_eq!(game.tick(&mut host), Ok(Tick::Running(29)));
        let alarm = AlarmMessage::Tick { round: 0, index: 1 };
        assert_eq!(host.scheduled.last(), Some(&(alarm, Duration::from_secs(1))));
        assert_eq!(game.receive_alarm(&alarm, &mut host), Ok(Tick::Running(28)));
        let scheduled = host.scheduled.len();

        game.start_question(0, 1, &mut host).unwrap();
        assert_eq!(game.selected(), None);
        assert_eq!(game.time_remaining(), 28);
        assert_eq!(host.scheduled.len(), scheduled);
        assert_eq!(
            host.last_notice(),
            Some(&Notice::QuestionStarted {
                round: 0,
                index: 1,
                count: 3,
                seconds: Some(28),
            })
        );
    }

    #[test]
    fn test_timeout_while_looking_back() {
        let (mut game, mut host) = new_game([3, 1, 1]);
        answer(&mut game, &mut host, RIGHT);
        game.start_question(0, 0, &mut host).unwrap();

        for _ in 0..29 {
            game.tick(&mut host).unwrap();
        }
        assert_eq!(game.tick(&mut host), Ok(Tick::Expired));

        let record = game.answer(0, 1).unwrap();
        assert_eq!(record.selected(), None);
        assert!(!record.is_correct());
        assert_eq!(game.answer(0, 0).unwrap().selected(), Some(RIGHT));
        assert_eq!(game.consecutive_wrong(), 1);
        assert!(host.saw(&Notice::TimedOut));
        assert_eq!(game.state(), State::AwaitingAnswer { round: 0, index: 2 });
        assert_eq!(game.time_remaining(), 30);
    }

    #[test]
    fn test_fifty_fifty_survives_revisit() {
        let (mut game, mut host) = new_game([3, 1, 1]);
        answer(&mut game, &mut host, RIGHT);
        for _ in 0..20 {
            game.tick(&mut host).unwrap();
        }
        let remaining = game.apply_fifty_fifty(&mut host).unwrap();
        assert_eq!(game.time_remaining(), 10);

        game.start_question(0, 0, &mut host).unwrap();
        assert_eq!(game.visible_options(), vec!["A", "B", "C", "D"]);
        game.start_question(0, 1, &mut host).unwrap();

        let visible = game.visible_options();
        assert_eq!(visible, remaining.iter().map(String::as_str).collect_vec());
        assert_eq!(game.time_remaining(), 10);
        assert!(!game.lifelines(0).unwrap().is_available(Lifeline::FiftyFifty));

        let hidden = ["A", "B", "C", "D"]
            .into_iter()
            .find(|o| !remaining.iter().any(|r| r == o))
            .unwrap();
        assert_eq!(
            game.submit(Some(hidden), SubmitReason::Normal, &mut host),
            Err(Error::OptionHidden)
        );
        assert_eq!(
            game.apply_fifty_fifty(&mut host),
            Err(Error::LifelineUsed(Lifeline::FiftyFifty))
        );
        assert_eq!(game.visible_options().len(), 2);
    }

    #[test]
    fn test_start_question_beyond_frontier() {
        let (mut game, mut host) = new_game([3, 1, 1]);
        assert_eq!(
            game.start_question(0, 2, &mut host),
            Err(Error::OutOfRange { round: 0, index: 2 })
        );
        assert_eq!(
            game.start_question(1, 0, &mut host),
            Err(Error::OutOfRange { round: 1, index: 0 })
        );
        assert_eq!(game.state(), State::AwaitingAnswer { round: 0, index: 0 });
    }

    #[test]
    fn test_tick_counts_down_and_reschedules() {
        let (mut game, mut host) = new_game([3, 1, 1]);
        assert_eq!(game.tick(&mut host), Ok(Tick::Running(29)));
        assert_eq!(game.time_remaining(), 29);
        assert_eq!(host.scheduled.len(), 2);
    }

    #[test]
    fn test_timeout_records_wrong_answer() {
        let (mut game, mut host) = new_game([3, 1, 1]);
        for _ in 0..29 {
            game.tick(&mut host).unwrap();
        }
        assert_eq!(game.time_remaining(), 1);

        assert_eq!(game.tick(&mut host), Ok(Tick::Expired));
        let record = game.answer(0, 0).unwrap();
        assert_eq!(record.selected(), None);
        assert!(!record.is_correct());
        assert_eq!(record.points(), 0);
        assert_eq!(game.consecutive_wrong(), 1);
        assert!(host.saw(&Notice::TimedOut));
        assert_eq!(game.state(), State::AwaitingAnswer { round: 0, index: 1 });
        assert_eq!(game.time_remaining(), 30);
    }

    #[test]
    fn test_timeout_does_not_consume_lifelines() {
        let (mut game, mut host) = new_game([3, 1, 1]);
        game.submit(None, SubmitReason::Timeout, &mut host).unwrap();
        assert_eq!(game.lifelines(0).unwrap().remaining().len(), 3);
    }

    #[test]
    fn test_stale_alarm_ignored() {
        let (mut game, mut host) = new_game([3, 1, 1]);
        answer(&mut game, &mut host, RIGHT);

        let alarm = AlarmMessage::Tick { round: 0, index: 0 };
        assert_eq!(game.receive_alarm(&alarm, &mut host), Ok(Tick::Idle));
        assert_eq!(game.time_remaining(), 30);

        let alarm = AlarmMessage::Tick { round: 0, index: 1 };
        assert_eq!(game.receive_alarm(&alarm, &mut host), Ok(Tick::Running(29)));
    }

    #[test]
    fn test_skip_keeps_wrong_run() {
        let (mut game, mut host) = new_game([5, 1, 1]);
        answer(&mut game, &mut host, WRONG);
        answer(&mut game, &mut host, WRONG);

        let record = game.skip(&mut host).unwrap();
        assert!(record.was_skipped());
        assert_eq!(record.points(), 0);
        assert_eq!(game.consecutive_wrong(), 2);
        assert_eq!(game.state(), State::AwaitingAnswer { round: 0, index: 3 });
        assert!(!game.lifelines(0).unwrap().is_available(Lifeline::Skip));
        assert!(host.saw(&Notice::Skipped));
    }

    #[test]
    fn test_skip_only_once_per_round() {
        let (mut game, mut host) = new_game([3, 1, 1]);
        game.skip(&mut host).unwrap();

        assert_eq!(
            game.skip(&mut host),
            Err(Error::LifelineUsed(Lifeline::Skip))
        );
        assert!(game.answer(0, 1).is_none());
        assert_eq!(game.state(), State::AwaitingAnswer { round: 0, index: 1 });
    }

    #[test]
    fn test_three_wrong_in_a_row_disqualifies() {
        let (mut game, mut host) = new_game([6, 1, 1]);
        answer(&mut game, &mut host, RIGHT);
        answer(&mut game, &mut host, WRONG);
        answer(&mut game, &mut host, WRONG);
        game.submit(None, SubmitReason::Timeout, &mut host).unwrap();

        assert_eq!(
            game.state(),
            State::Disqualified(Disqualification::ConsecutiveWrong)
        );
        assert!(game.state().is_terminal());
        assert!(host.saw(&Notice::Disqualified(Disqualification::ConsecutiveWrong)));
        assert_eq!(
            game.submit(Some(RIGHT), SubmitReason::Normal, &mut host),
            Err(Error::NotAwaitingAnswer)
        );
        assert_eq!(game.tick(&mut host), Ok(Tick::Idle));
    }

    #[test]
    fn test_wrong_after_skip_still_disqualifies() {
        let (mut game, mut host) = new_game([6, 1, 1]);
        answer(&mut game, &mut host, WRONG);
        answer(&mut game, &mut host, WRONG);
        game.skip(&mut host).unwrap();
        assert!(!game.state().is_terminal());

        answer(&mut game, &mut host, WRONG);
        assert_eq!(
            game.state(),
            State::Disqualified(Disqualification::ConsecutiveWrong)
        );
    }

    #[test]
    fn test_disqualification_on_last_question_wins_over_gate() {
        let (mut game, mut host) = new_game([3, 1, 1]);
        for _ in 0..3 {
            answer(&mut game, &mut host, WRONG);
        }
        assert_eq!(
            game.state(),
            State::Disqualified(Disqualification::ConsecutiveWrong)
        );
        assert!(!host
            .notices
            .iter()
            .any(|n| matches!(n, Notice::RoundFailed { .. })));
    }

    #[test]
    fn test_fifty_fifty_leaves_two_options() {
        let (mut game, mut host) = new_game([3, 1, 1]);
        let remaining = game.apply_fifty_fifty(&mut host).unwrap();

        assert_eq!(remaining.len(), 2);
        assert!(remaining.iter().any(|o| o == RIGHT));
        assert_eq!(game.visible_options().len(), 2);
        assert!(!game.lifelines(0).unwrap().is_available(Lifeline::FiftyFifty));
        assert!(host.saw(&Notice::FiftyFiftyApplied {
            remaining: remaining.clone()
        }));
    }

    #[test]
    fn test_fifty_fifty_second_use_keeps_reveal() {
        let (mut game, mut host) = new_game([3, 1, 1]);
        let remaining = game.apply_fifty_fifty(&mut host).unwrap();

        assert_eq!(
            game.apply_fifty_fifty(&mut host),
            Err(Error::LifelineUsed(Lifeline::FiftyFifty))
        );
        let visible = game.visible_options();
        assert_eq!(visible, remaining.iter().map(String::as_str).collect_vec());
    }

    #[test]
    fn test_fifty_fifty_hidden_option_cannot_be_chosen() {
        let (mut game, mut host) = new_game([3, 1, 1]);
        let remaining = game.apply_fifty_fifty(&mut host).unwrap();
        let hidden = ["A", "B", "C", "D"]
            .into_iter()
            .find(|o| !remaining.iter().any(|r| r == o))
            .unwrap();

        assert_eq!(game.select(hidden, &mut host), Err(Error::OptionHidden));
        assert_eq!(
            game.submit(Some(hidden), SubmitReason::Normal, &mut host),
            Err(Error::OptionHidden)
        );
        assert!(game.answer(0, 0).is_none());
    }

    #[test]
    fn test_fifty_fifty_cleared_on_next_question() {
        let (mut game, mut host) = new_game([3, 1, 1]);
        game.apply_fifty_fifty(&mut host).unwrap();
        answer(&mut game, &mut host, RIGHT);

        assert_eq!(game.visible_options(), vec!["A", "B", "C", "D"]);
        assert_eq!(
            game.apply_fifty_fifty(&mut host),
            Err(Error::LifelineUsed(Lifeline::FiftyFifty))
        );
    }

    #[test]
    fn test_armed_bonus_then_correct_grants_two() {
        let (mut game, mut host) = new_game([3, 1, 1]);
        game.arm_bonus(&mut host).unwrap();
        assert!(game.bonus_armed(0));
        assert!(game.lifelines(0).unwrap().is_available(Lifeline::Bonus));

        let record = answer(&mut game, &mut host, RIGHT);
        assert_eq!(record.points(), 2);
        assert_eq!(game.score(), 2);
        assert!(!game.bonus_armed(0));
        assert!(!game.lifelines(0).unwrap().is_available(Lifeline::Bonus));
        assert!(host.saw(&Notice::BonusAwarded { points: 2 }));

        let record = answer(&mut game, &mut host, RIGHT);
        assert_eq!(record.points(), 1);
    }

    #[test]
    fn test_armed_bonus_then_wrong_stays_armed() {
        let (mut game, mut host) = new_game([3, 1, 1]);
        game.arm_bonus(&mut host).unwrap();

        let record = answer(&mut game, &mut host, WRONG);
        assert_eq!(record.points(), 0);
        assert!(game.bonus_armed(0));
        assert!(game.lifelines(0).unwrap().is_available(Lifeline::Bonus));

        let record = answer(&mut game, &mut host, RIGHT);
        assert_eq!(record.points(), 2);
        assert!(!game.lifelines(0).unwrap().is_available(Lifeline::Bonus));
    }

    #[test]
    fn test_arm_bonus_twice_rejected() {
        let (mut game, mut host) = new_game([3, 1, 1]);
        game.arm_bonus(&mut host).unwrap();
        assert_eq!(game.arm_bonus(&mut host), Err(Error::BonusAlreadyArmed));
    }

    #[test]
    fn test_arm_bonus_after_use_rejected() {
        let (mut game, mut host) = new_game([3, 1, 1]);
        game.submit(Some(RIGHT), SubmitReason::Bonus, &mut host)
            .unwrap();
        assert_eq!(
            game.arm_bonus(&mut host),
            Err(Error::LifelineUsed(Lifeline::Bonus))
        );
    }

    #[test]
    fn test_bonus_submit_after_use_scores_one() {
        let (mut game, mut host) = new_game([3, 1, 1]);
        let first = game
            .submit(Some(RIGHT), SubmitReason::Bonus, &mut host)
            .unwrap();
        assert_eq!(first.points(), 2);

        let second = game
            .submit(Some(RIGHT), SubmitReason::Bonus, &mut host)
            .unwrap();
        assert_eq!(second.points(), 1);
        assert!(host.saw(&Notice::BonusUnavailable));
        assert_eq!(game.score(), 3);
    }

    #[test]
    fn test_bonus_submit_wrong_keeps_lifeline() {
        let (mut game, mut host) = new_game([3, 1, 1]);
        game.submit(Some(WRONG), SubmitReason::Bonus, &mut host)
            .unwrap();
        assert!(game.lifelines(0).unwrap().is_available(Lifeline::Bonus));
        assert!(!game.bonus_armed(0));
    }

    #[test]
    fn test_select_and_submit_selected() {
        let (mut game, mut host) = new_game([3, 1, 1]);
        assert_eq!(
            game.submit_selected(SubmitReason::Normal, &mut host),
            Err(Error::NothingSelected)
        );
        assert_eq!(game.select("Z", &mut host), Err(Error::UnknownOption));

        game.select(WRONG, &mut host).unwrap();
        game.select(RIGHT, &mut host).unwrap();
        assert_eq!(game.selected(), Some(RIGHT));

        let record = game.submit_selected(SubmitReason::Normal, &mut host).unwrap();
        assert!(record.is_correct());
        assert_eq!(game.selected(), None);
    }

    #[test]
    fn test_unknown_option_rejected() {
        let (mut game, mut host) = new_game([3, 1, 1]);
        assert_eq!(
            game.submit(Some("Z"), SubmitReason::Normal, &mut host),
            Err(Error::UnknownOption)
        );
        assert!(game.answers().is_empty());
    }

    #[test]
    fn test_round_one_gate_fails_at_five() {
        let (mut game, mut host) = new_game([6, 1, 1]);
        answer_all(&mut game, &mut host, 5);
        answer(&mut game, &mut host, WRONG);

        assert_eq!(
            game.state(),
            State::Eliminated {
                round: 0,
                score: 5,
                required: 6,
            }
        );
        assert!(game.state().is_terminal());
        assert!(host.saw(&Notice::RoundFailed {
            round: 0,
            score: 5,
            required: 6,
        }));
        assert!(host.store.results().is_empty());
    }

    #[test]
    fn test_round_one_gate_passes_at_six() {
        let (mut game, mut host) = new_game([6, 1, 1]);
        answer_all(&mut game, &mut host, 6);

        assert_eq!(game.state(), State::RoundTransition { round: 0 });
        assert!(!game.state().is_terminal());
        assert!(host.saw(&Notice::RoundCleared { round: 0, score: 6 }));
        assert_eq!(game.tick(&mut host), Ok(Tick::Idle));
    }

    #[test]
    fn test_round_two_gate_fails_at_fifteen() {
        let (mut game, mut host) = new_game([6, 10, 1]);
        answer_all(&mut game, &mut host, 6);
        game.confirm_next_round(&mut host).unwrap();
        answer_all(&mut game, &mut host, 9);
        answer(&mut game, &mut host, WRONG);

        assert_eq!(
            game.state(),
            State::Eliminated {
                round: 1,
                score: 15,
                required: 16,
            }
        );
    }

    #[test]
    fn test_round_two_gate_passes_at_sixteen() {
        let (mut game, mut host) = new_game([6, 10, 1]);
        answer_all(&mut game, &mut host, 6);
        game.confirm_next_round(&mut host).unwrap();
        answer_all(&mut game, &mut host, 10);

        assert_eq!(game.state(), State::RoundTransition { round: 1 });
        assert_eq!(game.score(), 16);
    }

    #[test]
    fn test_confirm_next_round_only_in_transition() {
        let (mut game, mut host) = new_game([6, 1, 1]);
        assert_eq!(
            game.confirm_next_round(&mut host),
            Err(Error::NotInTransition)
        );

        answer_all(&mut game, &mut host, 6);
        game.confirm_next_round(&mut host).unwrap();
        assert_eq!(game.state(), State::AwaitingAnswer { round: 1, index: 0 });
        assert_eq!(game.time_remaining(), 30);
        assert!(host
            .scheduled
            .contains(&(AlarmMessage::Tick { round: 1, index: 0 }, Duration::from_secs(1))));
    }

    #[test]
    fn test_lifelines_are_per_round() {
        let (mut game, mut host) = new_game([7, 2, 1]);
        game.skip(&mut host).unwrap();
        game.apply_fifty_fifty(&mut host).unwrap();
        game.arm_bonus(&mut host).unwrap();
        answer_all(&mut game, &mut host, 6);
        assert_eq!(game.state(), State::RoundTransition { round: 0 });

        game.confirm_next_round(&mut host).unwrap();
        assert!(game.lifelines(0).unwrap().remaining().is_empty());
        assert_eq!(game.lifelines(1).unwrap().remaining().len(), 3);
        assert!(!game.bonus_armed(1));
        game.skip(&mut host).unwrap();
    }

    #[test]
    fn test_bonus_arm_cleared_on_round_change() {
        let (mut game, mut host) = new_game([6, 2, 1]);
        answer_all(&mut game, &mut host, 5);
        game.arm_bonus(&mut host).unwrap();
        answer(&mut game, &mut host, WRONG);
        assert!(game.bonus_armed(0));
        assert_eq!(game.score(), 5);
        assert!(game.state().is_terminal());

        let (mut game, mut host) = new_game([7, 2, 1]);
        answer_all(&mut game, &mut host, 6);
        game.arm_bonus(&mut host).unwrap();
        answer(&mut game, &mut host, WRONG);
        game.confirm_next_round(&mut host).unwrap();
        assert!(!game.bonus_armed(0));
        assert!(!game.bonus_armed(1));
    }

    fn play_to_final_round(sizes: [usize; 3]) -> (Game, MockHost) {
        let (mut game, mut host) = new_game(sizes);
        answer_all(&mut game, &mut host, sizes[0]);
        game.confirm_next_round(&mut host).unwrap();
        answer_all(&mut game, &mut host, sizes[1]);
        game.confirm_next_round(&mut host).unwrap();
        (game, host)
    }

    #[test]
    fn test_finish_awards_prize_and_saves() {
        let (mut game, mut host) = play_to_final_round([6, 10, 10]);
        answer_all(&mut game, &mut host, 10);

        assert_eq!(
            game.state(),
            State::Finished {
                score: 26,
                prize: Some(Prize::OneMillion),
            }
        );
        assert_eq!(
            host.last_notice(),
            Some(&Notice::Finished {
                score: 26,
                prize: Some(Prize::OneMillion),
            })
        );
        let saved = host.store.results();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].player(), "player-1");
        assert_eq!(saved[0].score(), 26);
        assert_eq!(saved[0].prize(), Some(Prize::OneMillion));
    }

    #[test]
    fn test_finish_with_bonuses_reaches_trip() {
        let (mut game, mut host) = new_game([6, 10, 15]);
        game.arm_bonus(&mut host).unwrap();
        answer_all(&mut game, &mut host, 6);
        game.confirm_next_round(&mut host).unwrap();
        game.arm_bonus(&mut host).unwrap();
        answer_all(&mut game, &mut host, 10);
        game.confirm_next_round(&mut host).unwrap();
        game.arm_bonus(&mut host).unwrap();
        answer_all(&mut game, &mut host, 15);

        assert_eq!(
            game.state(),
            State::Finished {
                score: 34,
                prize: Some(Prize::TripToSwitzerland),
            }
        );
    }

    #[test]
    fn test_finish_without_prize() {
        let (mut game, mut host) = play_to_final_round([6, 10, 4]);
        answer(&mut game, &mut host, RIGHT);
        answer(&mut game, &mut host, WRONG);
        answer(&mut game, &mut host, RIGHT);
        answer(&mut game, &mut host, WRONG);

        assert_eq!(
            game.state(),
            State::Finished {
                score: 18,
                prize: None,
            }
        );
        assert_eq!(host.store.results()[0].prize(), None);
    }

    #[test]
    fn test_finish_survives_store_failure() {
        let (mut game, mut host) = play_to_final_round([6, 10, 4]);
        host.store_down = true;
        answer_all(&mut game, &mut host, 4);

        assert_eq!(
            game.state(),
            State::Finished {
                score: 20,
                prize: Some(Prize::FiftyThousand),
            }
        );
        assert!(host.saw(&Notice::ResultNotSaved(result::Error::Unavailable)));
        assert_eq!(
            host.last_notice(),
            Some(&Notice::Finished {
                score: 20,
                prize: Some(Prize::FiftyThousand),
            })
        );
    }

    #[test]
    fn test_abandon_disqualifies() {
        let (mut game, mut host) = new_game([3, 1, 1]);
        game.abandon(&mut host);

        assert_eq!(game.state(), State::Disqualified(Disqualification::Abandoned));
        assert!(host
            .cancelled
            .contains(&AlarmMessage::Tick { round: 0, index: 0 }));
        assert_eq!(game.time_remaining(), 0);

        let notices = host.notices.len();
        game.abandon(&mut host);
        assert_eq!(host.notices.len(), notices);
    }

    #[test]
    fn test_score_matches_recorded_points() {
        let (mut game, mut host) = new_game([7, 4, 1]);
        game.arm_bonus(&mut host).unwrap();
        answer(&mut game, &mut host, RIGHT);
        answer(&mut game, &mut host, WRONG);
        game.skip(&mut host).unwrap();
        answer_all(&mut game, &mut host, 4);
        game.confirm_next_round(&mut host).unwrap();
        game.submit(Some(RIGHT), SubmitReason::Bonus, &mut host)
            .unwrap();
        game.submit(None, SubmitReason::Timeout, &mut host).unwrap();

        assert_eq!(game.score(), game.answers().total_points());
        assert_eq!(game.score(), 8);
    }

    #[test]
    fn test_snapshot_of_active_question() {
        let (mut game, mut host) = new_game([3, 1, 1]);
        game.select(RIGHT, &mut host).unwrap();
        let snapshot = game.snapshot();

        let view = snapshot.question.as_ref().unwrap();
        assert_eq!(view.round, 0);
        assert_eq!(view.index, 0);
        assert_eq!(view.count, 3);
        assert_eq!(view.prompt, "Round 1 question 1");
        assert_eq!(view.selected.as_deref(), Some(RIGHT));
        assert_eq!(view.seconds, 30);
        assert!(view.answer.is_none());
        assert!(view.correct.is_none());
        assert_eq!(snapshot.lifelines.len(), 3);

        let json = snapshot.to_message();
        assert!(json.contains("AwaitingAnswer"));
        assert!(!json.contains("\"correct\""));
    }

    #[test]
    fn test_snapshot_reveals_answer_on_revisit() {
        let (mut game, mut host) = new_game([3, 1, 1]);
        answer(&mut game, &mut host, WRONG);
        game.start_question(0, 0, &mut host).unwrap();

        let snapshot = game.snapshot();
        let view = snapshot.question.unwrap();
        assert_eq!(view.correct.as_deref(), Some(RIGHT));
        assert_eq!(view.answer.unwrap().selected(), Some(WRONG));
    }

    #[test]
    fn test_snapshot_after_game_over() {
        let (mut game, mut host) = new_game([3, 1, 1]);
        game.abandon(&mut host);
        let snapshot = game.snapshot();
        assert!(snapshot.question.is_none());
        assert_eq!(
            snapshot.state,
            State::Disqualified(Disqualification::Abandoned)
        );
    }

    #[test]
    fn test_game_debug_is_compact() {
        let (game, _) = new_game([1, 1, 1]);
        let debug = format!("{game:?}");
        assert!(debug.contains("player-1"));
        assert!(!debug.contains("question"));
    }
}
